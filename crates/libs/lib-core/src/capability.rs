//! # Capability Traits
//!
//! The boundary collaborators of the connection controller. The wallet
//! extension and the blockchain client are opaque services; these traits are
//! the only shape the controller relies on.
//!
//! All traits are `?Send`: the browser implementation wraps JS handles that
//! never leave the UI thread, and the controller is single-threaded.

use std::rc::Rc;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use shared::dto::network::NetworkInfo;

use crate::contract::SimpleStorageContract;
use crate::error::Result;

/// Browser-injected wallet interface.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Whether a wallet interface is present in the execution environment.
    fn is_present(&self) -> bool;

    /// Accounts the user already authorized for this origin. Never prompts.
    async fn authorized_accounts(&self) -> Result<Vec<Address>>;

    /// Ask the user for account access. May be rejected.
    async fn request_accounts(&self) -> Result<Vec<Address>>;
}

/// Blockchain client able to attach to the injected wallet.
#[async_trait(?Send)]
pub trait ChainClient {
    /// Attach a provider handle to the wallet.
    async fn attach(&self) -> Result<Rc<dyn ProviderHandle>>;

    /// Bind the deployed `SimpleStorage` contract to `signer`.
    fn bind_contract(
        &self,
        address: Address,
        signer: Rc<dyn SignerHandle>,
    ) -> Result<Rc<dyn ContractBinding>> {
        Ok(Rc::new(SimpleStorageContract::new(address, signer)))
    }
}

/// Read-only view of the connected network.
#[async_trait(?Send)]
pub trait ProviderHandle {
    /// Derive the signer for the wallet's active account.
    fn signer(&self) -> Result<Rc<dyn SignerHandle>>;

    async fn network(&self) -> Result<NetworkInfo>;

    /// Balance of `account` in wei.
    async fn balance(&self, account: Address) -> Result<U256>;
}

/// Handle able to submit state-changing transactions.
#[async_trait(?Send)]
pub trait SignerHandle {
    async fn address(&self) -> Result<Address>;

    /// Execute a read-only call against the latest block.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Submit a transaction and return its hash once the wallet accepted it.
    /// Does not wait for inclusion.
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash>;
}

/// Typed handle on the deployed contract.
#[async_trait(?Send)]
pub trait ContractBinding {
    async fn get(&self) -> Result<U256>;

    async fn set(&self, value: U256) -> Result<PendingTransaction>;
}

/// Transaction submitted but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: TxHash,
}

impl std::fmt::Display for PendingTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}
