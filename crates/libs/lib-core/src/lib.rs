//! # Core Library
//!
//! Wallet connection controller, capability traits, the SimpleStorage
//! binding, deployment configuration and the shared error type.
//!
//! Nothing in here touches the browser: the front-end plugs its EIP-1193
//! implementations into the [`capability`] traits, and the test suite plugs in
//! scripted ones.

pub mod capability;
pub mod config;
pub mod contract;
pub mod controller;
pub mod error;
pub mod format;
pub mod state;

// Re-export commonly used types
pub use capability::{
    ChainClient, ContractBinding, PendingTransaction, ProviderHandle, SignerHandle, WalletProvider,
};
pub use config::DeploymentConfig;
pub use controller::{ConnectionController, ConnectionHandle, Trigger};
pub use error::{ConnectError, Result};
pub use state::{ConnectionSnapshot, Phase};
