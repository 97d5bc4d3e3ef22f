//! # Centralized Error Handling
//!
//! [`ConnectError`] is the single error type shared by the connection
//! controller, the capability traits and the contract binding.
//!
//! ## Error Categories
//!
//! 1. **Connection stages** - caught at the stage boundary and turned into a
//!    state reset, never returned from `dispatch`
//!    - [`NoWalletDetected`](ConnectError::NoWalletDetected) → terminal for the session
//!    - [`AuthorizationRejected`](ConnectError::AuthorizationRejected) → back to pre-authorization
//!    - [`ProviderAttach`](ConnectError::ProviderAttach) → network/balance reset, authorization kept
//!
//! 2. **Contract actions** - returned to the caller of `read_value`/`write_value`
//!    - [`ContractNotBound`](ConnectError::ContractNotBound)
//!    - [`InvalidValue`](ConnectError::InvalidValue)
//!    - [`UserRejected`](ConnectError::UserRejected)
//!    - [`ContractCall`](ConnectError::ContractCall)
//!
//! 3. **Plumbing** - raised by capability implementations and config loading
//!    - [`Rpc`](ConnectError::Rpc), [`Decoding`](ConnectError::Decoding), [`Config`](ConnectError::Config)
//!
//! ```rust
//! use lib_core::error::ConnectError;
//!
//! let err = ConnectError::InvalidValue("value cannot be empty".to_string());
//! assert_eq!(err.code(), "InvalidValue");
//! assert_eq!(err.user_message(), "value cannot be empty");
//! ```

use thiserror::Error;

/// Convenience type alias for `Result<T, ConnectError>`.
pub type Result<T> = std::result::Result<T, ConnectError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// No injected wallet interface in the execution environment.
    #[error("No wallet detected")]
    NoWalletDetected,

    /// The user (or the wallet) refused account access.
    #[error("Authorization rejected: {0}")]
    AuthorizationRejected(String),

    /// Attaching the provider or fetching network/balance failed.
    #[error("Provider attach failed: {0}")]
    ProviderAttach(String),

    /// A contract read or write failed at the client.
    #[error("Contract call failed: {0}")]
    ContractCall(String),

    /// A contract action was invoked before the contract was bound.
    #[error("Contract is not bound")]
    ContractNotBound,

    /// Input could not be parsed as the contract's `uint256`.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The wallet reported that the user declined the request (EIP-1193 code 4001).
    #[error("Request rejected by user")]
    UserRejected,

    /// Raw wallet/JSON-RPC failure reported by a capability implementation.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Deployment configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A response could not be decoded (ABI, JSON, hex quantity).
    #[error("Decoding error: {0}")]
    Decoding(String),
}

impl ConnectError {
    /// Stable variant name, suitable for logs and UI test hooks.
    pub fn code(&self) -> &'static str {
        match self {
            ConnectError::NoWalletDetected => "NoWalletDetected",
            ConnectError::AuthorizationRejected(_) => "AuthorizationRejected",
            ConnectError::ProviderAttach(_) => "ProviderAttach",
            ConnectError::ContractCall(_) => "ContractCall",
            ConnectError::ContractNotBound => "ContractNotBound",
            ConnectError::InvalidValue(_) => "InvalidValue",
            ConnectError::UserRejected => "UserRejected",
            ConnectError::Rpc(_) => "Rpc",
            ConnectError::Config(_) => "Config",
            ConnectError::Decoding(_) => "Decoding",
        }
    }

    /// Short message for display next to the action that failed.
    ///
    /// Client and decoding details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ConnectError::NoWalletDetected => "Install MetaMask to continue".to_string(),
            ConnectError::AuthorizationRejected(_) => "Wallet access was not granted".to_string(),
            ConnectError::ProviderAttach(_) => "Could not reach the network".to_string(),
            ConnectError::ContractNotBound => {
                "Contract unavailable: connect to the expected network".to_string()
            }
            ConnectError::InvalidValue(msg) => msg.clone(),
            ConnectError::UserRejected => "Request rejected in wallet".to_string(),
            ConnectError::ContractCall(_) | ConnectError::Rpc(_) | ConnectError::Decoding(_) => {
                "Contract call failed".to_string()
            }
            ConnectError::Config(_) => "The app is misconfigured".to_string(),
        }
    }

    /// Re-label a plumbing error as a contract call failure, keeping
    /// rejections and taxonomy errors as they are.
    pub fn into_contract_call(self) -> Self {
        match self {
            ConnectError::Rpc(msg) | ConnectError::Decoding(msg) => ConnectError::ContractCall(msg),
            other => other,
        }
    }
}

impl From<serde_json::Error> for ConnectError {
    fn from(err: serde_json::Error) -> Self {
        ConnectError::Decoding(format!("JSON error: {}", err))
    }
}

impl From<alloy_sol_types::Error> for ConnectError {
    fn from(err: alloy_sol_types::Error) -> Self {
        ConnectError::Decoding(format!("ABI error: {}", err))
    }
}
