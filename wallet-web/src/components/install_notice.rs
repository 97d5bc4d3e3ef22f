use leptos::prelude::*;

/// Shown instead of the storage actions when no injected wallet was found.
#[component]
pub fn InstallNotice() -> impl IntoView {
    view! {
        <div class="card" style="max-width: 500px; text-align: center;">
            <h1 style="margin-bottom: 16px; font-size: 32px; font-weight: 700;">"INSTALL METAMASK"</h1>
            <p style="color: var(--text-secondary); margin-bottom: 24px;">
                "This page needs a browser wallet that injects window.ethereum."
            </p>
            <a href="https://metamask.io/download/" class="btn" target="_blank" rel="noopener noreferrer">
                "Get MetaMask"
            </a>
        </div>
    }
}
