//! Connection state management

use std::rc::Rc;

use leptos::prelude::*;
use lib_core::{
    ConnectionController, ConnectionHandle, ConnectionSnapshot, DeploymentConfig, Phase, Trigger,
};

use crate::services::ethereum::{forward_wallet_events, InjectedClient, InjectedWallet};

/// Global connection context
#[derive(Clone, Copy)]
pub struct ConnectionContext {
    pub snapshot: RwSignal<ConnectionSnapshot>,
    handle: StoredValue<ConnectionHandle, LocalStorage>,
}

impl ConnectionContext {
    pub fn new(config: DeploymentConfig) -> Self {
        let snapshot = RwSignal::new(ConnectionSnapshot::default());

        let mut controller =
            ConnectionController::new(config, Rc::new(InjectedWallet), Rc::new(InjectedClient));
        controller.subscribe(move |next| snapshot.set(next.clone()));

        Self {
            snapshot,
            handle: StoredValue::new_local(ConnectionHandle::new(controller)),
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        self.handle.get_value()
    }

    pub fn phase(&self) -> Phase {
        self.snapshot.with(|s| s.phase)
    }

    pub fn is_bound(&self) -> bool {
        self.snapshot.with(|s| s.contract_bound)
    }

    /// Run `trigger` in the background.
    pub fn dispatch(&self, trigger: Trigger) {
        let handle = self.handle();
        leptos::task::spawn_local(async move {
            let phase = handle.dispatch(trigger).await;
            log::debug!("Connection settled in {:?}", phase);
        });
    }
}

fn deployment_config() -> DeploymentConfig {
    match DeploymentConfig::from_build_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}, using the default deployment", e);
            DeploymentConfig::default()
        }
    }
}

/// Create the controller, hook up wallet events and start detection.
pub fn provide_connection_context() -> ConnectionContext {
    let config = deployment_config();
    log::info!(
        "SimpleStorage at {} on chain {}",
        config.contract_address,
        config.expected_chain_id
    );

    let context = ConnectionContext::new(config);
    provide_context(context);

    forward_wallet_events(&context.handle());
    context.dispatch(Trigger::Load);
    context
}

pub fn use_connection_context() -> ConnectionContext {
    expect_context::<ConnectionContext>()
}
