//! EIP-1193 request payloads and response decoding.
//!
//! Everything here is plain data so it can be tested off the browser.

use std::str::FromStr;

use alloy_primitives::{Address, Bytes, TxHash, U256};
use lib_core::ConnectError;
use lib_core::Result;
use serde::Serialize;

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_CODE: i64 = 4001;

pub const LATEST_BLOCK: &str = "latest";

pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const ETH_GET_BALANCE: &str = "eth_getBalance";
pub const ETH_CALL: &str = "eth_call";
pub const ETH_SEND_TRANSACTION: &str = "eth_sendTransaction";

pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
pub const CHAIN_CHANGED: &str = "chainChanged";

/// Transaction object for `eth_call` and `eth_sendTransaction`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

/// Map a provider error to the shared taxonomy.
pub fn classify_error(code: Option<i64>, message: String) -> ConnectError {
    match code {
        Some(USER_REJECTED_CODE) => ConnectError::UserRejected,
        Some(code) => ConnectError::Rpc(format!("{} (code {})", message, code)),
        None => ConnectError::Rpc(message),
    }
}

fn hex_digits<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ConnectError::Decoding(format!("{} '{}' is missing the 0x prefix", what, value)))?;
    if digits.is_empty() {
        return Err(ConnectError::Decoding(format!("{} '{}' has no digits", what, value)));
    }
    Ok(digits)
}

/// Decode a hex-encoded JSON-RPC quantity such as a balance.
pub fn parse_quantity(value: &str) -> Result<U256> {
    let digits = hex_digits(value, "quantity")?;
    U256::from_str_radix(digits, 16)
        .map_err(|e| ConnectError::Decoding(format!("quantity '{}': {}", value, e)))
}

/// Decode the `eth_chainId` result, also carried by `chainChanged`.
pub fn parse_chain_id(value: &str) -> Result<u64> {
    let digits = hex_digits(value, "chain id")?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| ConnectError::Decoding(format!("chain id '{}': {}", value, e)))
}

pub fn parse_accounts(values: &[String]) -> Result<Vec<Address>> {
    values
        .iter()
        .map(|value| {
            Address::from_str(value)
                .map_err(|e| ConnectError::Decoding(format!("account '{}': {}", value, e)))
        })
        .collect()
}

pub fn parse_data(value: &str) -> Result<Bytes> {
    Bytes::from_str(value).map_err(|e| ConnectError::Decoding(format!("call data: {}", e)))
}

pub fn parse_tx_hash(value: &str) -> Result<TxHash> {
    TxHash::from_str(value)
        .map_err(|e| ConnectError::Decoding(format!("transaction hash '{}': {}", value, e)))
}
