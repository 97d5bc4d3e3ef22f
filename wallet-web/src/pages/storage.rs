//! Storage Page - read and write the deployed SimpleStorage value

use leptos::prelude::*;
use lib_core::Phase;
use shared::dto::network::NetworkInfo;

use crate::components::InstallNotice;
use crate::state::connection::use_connection_context;

#[component]
pub fn StoragePage() -> impl IntoView {
    let ctx = use_connection_context();

    let (stored, set_stored) = signal(None::<String>);
    let (input, set_input) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (pending_tx, set_pending_tx) = signal(None::<String>);
    let (busy, set_busy) = signal(false);

    let disabled = move || !ctx.is_bound() || busy.get();

    let on_get = move |_| {
        let handle = ctx.handle();
        set_busy.set(true);
        set_error.set(None);
        leptos::task::spawn_local(async move {
            match handle.read_value().await {
                Ok(value) => {
                    log::info!("get() returned {}", value);
                    set_stored.set(Some(value));
                }
                Err(e) => {
                    log::warn!("get() failed: {}", e);
                    set_error.set(Some(e.user_message()));
                }
            }
            set_busy.set(false);
        });
    };

    let on_set = move |_| {
        let handle = ctx.handle();
        let raw = input.get_untracked();
        set_busy.set(true);
        set_error.set(None);
        set_pending_tx.set(None);
        leptos::task::spawn_local(async move {
            match handle.write_value(&raw).await {
                Ok(pending) => {
                    set_pending_tx.set(Some(pending.hash.to_string()));
                    set_input.set(String::new());
                }
                Err(e) => {
                    log::warn!("set({}) failed: {}", raw, e);
                    set_error.set(Some(e.user_message()));
                }
            }
            set_busy.set(false);
        });
    };

    // Why the buttons are disabled, if they are.
    let hint = move || {
        ctx.snapshot.with(|s| match s.phase {
            Phase::ContractBound => None,
            Phase::ProviderReady => Some(format!(
                "Switch your wallet to {}",
                NetworkInfo::from_chain_id(s.expected_chain_id)
            )),
            phase => Some(phase.label().to_string()),
        })
    };

    view! {
        <div class="app-container" style="display: flex; justify-content: center; align-items: center; min-height: calc(100vh - 60px);">
            {move || {
                if ctx.phase() == Phase::NoWallet {
                    view! { <InstallNotice/> }.into_any()
                } else {
                    view! {
                        <div class="card" style="width: 100%; max-width: 500px; padding: var(--spacing-xl);">
                            <h1 class="card-title" style="text-align: center; margin-bottom: var(--spacing-md);">
                                "SimpleStorage"
                            </h1>

                            {move || hint().map(|text| view! {
                                <p class="hint" style="text-align: center; color: var(--text-secondary);">{text}</p>
                            })}

                            <div class="action-row">
                                <button class="btn" disabled=disabled on:click=on_get>
                                    "GET"
                                </button>
                                <p class="stored-value">
                                    {move || stored.get().unwrap_or_else(|| "-".to_string())}
                                </p>
                            </div>

                            <div class="action-row">
                                <input
                                    type="text"
                                    placeholder="New value"
                                    prop:value=move || input.get()
                                    on:input=move |ev| set_input.set(event_target_value(&ev))
                                />
                                <button class="btn" disabled=disabled on:click=on_set>
                                    "SET"
                                </button>
                            </div>

                            {move || pending_tx.get().map(|hash| view! {
                                <p class="tx-hash" style="font-family: monospace; word-break: break-all;">
                                    "Submitted: " {hash}
                                </p>
                            })}

                            {move || error.get().map(|msg| view! {
                                <p class="error" style="color: var(--bg-error);">{msg}</p>
                            })}
                        </div>
                    }.into_any()
                }
            }}
        </div>
    }
}
