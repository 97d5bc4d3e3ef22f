//! Connection Status Page - phase, account, network and balance

use leptos::prelude::*;
use lib_core::{Phase, Trigger};
use shared::dto::network::NetworkInfo;

use crate::state::connection::use_connection_context;

#[component]
pub fn StatusPage() -> impl IntoView {
    let ctx = use_connection_context();

    let action = move || match ctx.phase() {
        Phase::WalletDetected | Phase::PendingAuthorization | Phase::Unauthorized => {
            Some(("Connect", Trigger::Connect))
        }
        Phase::Authorized | Phase::ProviderReady | Phase::ContractBound => {
            Some(("Refresh", Trigger::Refresh))
        }
        Phase::Unknown | Phase::NoWallet => None,
    };

    let row = |label: &'static str, value: String| {
        view! {
            <p style="color: var(--text-secondary); margin-bottom: var(--spacing-sm);">{label}</p>
            <p style="font-family: monospace; color: var(--text-primary); word-break: break-all; margin-bottom: var(--spacing-lg);">
                {value}
            </p>
        }
    };

    view! {
        <div class="app-container" style="display: flex; justify-content: center; align-items: center; min-height: calc(100vh - 60px);">
            <div class="card" style="width: 100%; max-width: 500px; padding: var(--spacing-xl);">
                <h1 class="card-title" style="text-align: center; margin-bottom: var(--spacing-md);">
                    "Connection Status"
                </h1>

                {move || {
                    let s = ctx.snapshot.get();
                    let account = if s.authorized { s.account.to_string() } else { "-".to_string() };
                    let network = s.network.as_ref().map_or_else(|| "-".to_string(), ToString::to_string);
                    let expected = NetworkInfo::from_chain_id(s.expected_chain_id).to_string();

                    view! {
                        <div style="background: var(--bg-card); padding: var(--spacing-lg); border-radius: var(--border-radius); border: 1px solid var(--border-color); margin-bottom: var(--spacing-lg);">
                            {row("Status", s.phase.label().to_string())}
                            {row("Account", account)}
                            {row("Network", network)}
                            {row("Balance", format!("{} ETH", s.balance))}
                            {row("Expected network", expected)}
                        </div>
                    }
                }}

                {move || action().map(|(label, trigger)| view! {
                    <button
                        class="btn"
                        style="width: 100%;"
                        on:click=move |_| ctx.dispatch(trigger.clone())
                    >
                        {label}
                    </button>
                })}
            </div>
        </div>
    }
}
