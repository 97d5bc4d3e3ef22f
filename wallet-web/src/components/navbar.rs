//! Navigation Bar Component

use leptos::prelude::*;
use leptos_router::components::A;
use shared::utils::truncate_address;

use crate::state::connection::use_connection_context;

#[component]
pub fn Navbar() -> impl IntoView {
    let ctx = use_connection_context();

    let account = move || {
        ctx.snapshot.with(|s| {
            if s.authorized {
                truncate_address(&s.account.to_string())
            } else {
                "Not connected".to_string()
            }
        })
    };

    view! {
        <nav>
            <div style="max-width: 1200px; margin: 0 auto; padding: 0 24px; display: flex; justify-content: space-between; align-items: center;">
                <A href="/" attr:class="nav-link-clean">
                    <span class="nav-title">"SimpleStorage"</span>
                </A>
                <div style="display: flex; gap: 16px; align-items: center;">
                    <A href="/status" attr:class="nav-link-clean">"Status"</A>
                    <span class="nav-account" style="font-family: monospace;">{account}</span>
                </div>
            </div>
        </nav>
    }
}
