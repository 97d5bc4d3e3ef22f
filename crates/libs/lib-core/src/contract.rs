//! # SimpleStorage Binding
//!
//! ABI-level binding of the deployed contract: a single `uint256` behind a
//! `get()` accessor and a `set(uint256)` mutator. Calls go through whatever
//! [`SignerHandle`] the contract was bound to.

use std::rc::Rc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;

use crate::capability::{ContractBinding, PendingTransaction, SignerHandle};
use crate::error::{ConnectError, Result};

sol! {
    /// Interface descriptor of the deployed contract.
    interface SimpleStorage {
        function get() external view returns (uint256);
        function set(uint256 x) external;
    }
}

pub struct SimpleStorageContract {
    address: Address,
    signer: Rc<dyn SignerHandle>,
}

impl SimpleStorageContract {
    pub fn new(address: Address, signer: Rc<dyn SignerHandle>) -> Self {
        Self { address, signer }
    }

    pub fn address(&self) -> Address {
        self.address
    }
}

#[async_trait(?Send)]
impl ContractBinding for SimpleStorageContract {
    async fn get(&self) -> Result<U256> {
        let data = SimpleStorage::getCall {}.abi_encode();
        let raw = self
            .signer
            .call(self.address, data.into())
            .await
            .map_err(ConnectError::into_contract_call)?;

        SimpleStorage::getCall::abi_decode_returns(&raw).map_err(|e| {
            ConnectError::ContractCall(format!(
                "unexpected get() return data from {} ({} bytes): {}",
                self.address,
                raw.len(),
                e
            ))
        })
    }

    async fn set(&self, value: U256) -> Result<PendingTransaction> {
        let data = SimpleStorage::setCall { x: value }.abi_encode();
        let hash = self
            .signer
            .send_transaction(self.address, data.into())
            .await
            .map_err(ConnectError::into_contract_call)?;

        tracing::info!(contract = %self.address, %value, tx = %hash, "set() submitted");
        Ok(PendingTransaction { hash })
    }
}

/// Parse user input as the contract's `uint256`.
///
/// Accepts decimal or `0x`-prefixed hex, surrounded by whitespace.
pub fn parse_storage_value(input: &str) -> Result<U256> {
    let value = input.trim();

    if value.is_empty() {
        return Err(ConnectError::InvalidValue("value cannot be empty".to_string()));
    }
    if value.starts_with('-') {
        return Err(ConnectError::InvalidValue(
            "value must not be negative".to_string(),
        ));
    }
    if value.contains('.') {
        return Err(ConnectError::InvalidValue(
            "value must be a whole number".to_string(),
        ));
    }

    value.parse::<U256>().map_err(|e| {
        ConnectError::InvalidValue(format!("'{}' is not a valid uint256: {}", value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, TxHash};
    use alloy_sol_types::SolValue;
    use std::cell::RefCell;

    /// Signer backed by a single storage slot.
    #[derive(Default)]
    struct SlotSigner {
        slot: RefCell<U256>,
        fail_with: Option<ConnectError>,
    }

    #[async_trait(?Send)]
    impl SignerHandle for SlotSigner {
        async fn address(&self) -> Result<Address> {
            Ok(Address::with_last_byte(0xab))
        }

        async fn call(&self, _to: Address, data: Bytes) -> Result<Bytes> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            assert_eq!(&data[..4], SimpleStorage::getCall::SELECTOR.as_slice());
            Ok(self.slot.borrow().abi_encode().into())
        }

        async fn send_transaction(&self, _to: Address, data: Bytes) -> Result<TxHash> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let call = SimpleStorage::setCall::abi_decode(&data)?;
            *self.slot.borrow_mut() = call.x;
            Ok(TxHash::with_last_byte(1))
        }
    }

    #[test]
    fn test_selectors() {
        assert_eq!(SimpleStorage::getCall::SELECTOR, [0x6d, 0x4c, 0xe6, 0x3c]);
        assert_eq!(SimpleStorage::setCall::SELECTOR, [0x60, 0xfe, 0x47, 0xb1]);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let signer = Rc::new(SlotSigner::default());
        let contract = SimpleStorageContract::new(Address::with_last_byte(7), signer.clone());

        let pending = contract.set(U256::from(42)).await.unwrap();
        assert_eq!(pending.hash, TxHash::with_last_byte(1));
        assert_eq!(contract.get().await.unwrap(), U256::from(42));
    }

    #[tokio::test]
    async fn test_rpc_failure_becomes_contract_call() {
        let signer = Rc::new(SlotSigner {
            fail_with: Some(ConnectError::Rpc("execution reverted".to_string())),
            ..Default::default()
        });
        let contract = SimpleStorageContract::new(Address::with_last_byte(7), signer);

        let err = contract.get().await.unwrap_err();
        assert_eq!(err, ConnectError::ContractCall("execution reverted".to_string()));
    }

    #[tokio::test]
    async fn test_user_rejection_is_kept() {
        let signer = Rc::new(SlotSigner {
            fail_with: Some(ConnectError::UserRejected),
            ..Default::default()
        });
        let contract = SimpleStorageContract::new(Address::with_last_byte(7), signer);

        let err = contract.set(U256::from(1)).await.unwrap_err();
        assert_eq!(err, ConnectError::UserRejected);
    }

    #[test]
    fn test_parse_storage_value() {
        assert_eq!(parse_storage_value("42").unwrap(), U256::from(42));
        assert_eq!(parse_storage_value("  7 \n").unwrap(), U256::from(7));
        assert_eq!(parse_storage_value("0x2a").unwrap(), U256::from(42));
        assert_eq!(parse_storage_value(&U256::MAX.to_string()).unwrap(), U256::MAX);
    }

    #[test]
    fn test_parse_storage_value_rejects() {
        for input in ["", "   ", "-1", "1.5", "forty-two", "0xzz"] {
            let err = parse_storage_value(input).unwrap_err();
            assert_eq!(err.code(), "InvalidValue", "input {:?}", input);
        }

        let overflow = format!("{}0", U256::MAX);
        assert!(parse_storage_value(&overflow).is_err());
    }
}
