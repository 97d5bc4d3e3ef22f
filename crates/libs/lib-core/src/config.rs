//! # Deployment Configuration
//!
//! Where the `SimpleStorage` contract lives and which network it lives on.
//! Both values are externally supplied constants; the controller only binds the
//! contract when the wallet reports the expected chain id.
//!
//! | Variable | Default |
//! |---|---|
//! | `STORAGE_CONTRACT_ADDRESS` | [`DEFAULT_CONTRACT_ADDRESS`] |
//! | `STORAGE_CHAIN_ID` | [`DEFAULT_CHAIN_ID`] (Rinkeby) |
//!
//! Native tools read them at runtime with [`DeploymentConfig::from_env`]. The
//! wasm front-end has no process environment, so it captures the same keys at
//! compile time with [`DeploymentConfig::from_build_env`].

use std::str::FromStr;

use alloy_primitives::{address, Address};

use crate::error::{ConnectError, Result};

pub const CONTRACT_ADDRESS_ENV: &str = "STORAGE_CONTRACT_ADDRESS";
pub const CHAIN_ID_ENV: &str = "STORAGE_CHAIN_ID";

/// Address of the SimpleStorage deployment used when none is configured.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// Rinkeby.
pub const DEFAULT_CHAIN_ID: u64 = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentConfig {
    /// Deployed `SimpleStorage` contract address.
    pub contract_address: Address,

    /// Chain id the contract is deployed on. Binding is refused on any other chain.
    pub expected_chain_id: u64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            expected_chain_id: DEFAULT_CHAIN_ID,
        }
    }
}

impl DeploymentConfig {
    pub fn new(contract_address: Address, expected_chain_id: u64) -> Self {
        Self {
            contract_address,
            expected_chain_id,
        }
    }

    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine: every key has a default.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Load configuration captured from the build environment.
    pub fn from_build_env() -> Result<Self> {
        Self::from_lookup(|key| match key {
            CONTRACT_ADDRESS_ENV => option_env!("STORAGE_CONTRACT_ADDRESS").map(str::to_string),
            CHAIN_ID_ENV => option_env!("STORAGE_CHAIN_ID").map(str::to_string),
            _ => None,
        })
    }

    /// Build and validate a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let contract_address = match lookup(CONTRACT_ADDRESS_ENV) {
            Some(raw) => Address::from_str(raw.trim()).map_err(|e| {
                ConnectError::Config(format!("{} must be a hex address: {}", CONTRACT_ADDRESS_ENV, e))
            })?,
            None => defaults.contract_address,
        };

        let expected_chain_id = match lookup(CHAIN_ID_ENV) {
            Some(raw) => raw.trim().parse().map_err(|e| {
                ConnectError::Config(format!("{} must be a valid number: {}", CHAIN_ID_ENV, e))
            })?,
            None => defaults.expected_chain_id,
        };

        let config = Self {
            contract_address,
            expected_chain_id,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller could never bind against.
    pub fn validate(&self) -> Result<()> {
        if self.contract_address == Address::ZERO {
            return Err(ConnectError::Config(format!(
                "{} must not be the zero address",
                CONTRACT_ADDRESS_ENV
            )));
        }

        if self.expected_chain_id == 0 {
            return Err(ConnectError::Config(format!("{} must be non-zero", CHAIN_ID_ENV)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DeploymentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DeploymentConfig::default());
        assert_eq!(config.expected_chain_id, 4);
        assert_eq!(config.contract_address, DEFAULT_CONTRACT_ADDRESS);
    }

    #[test]
    fn test_overrides() {
        let config = DeploymentConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_ENV, " 0x00000000000000000000000000000000000000aa "),
            (CHAIN_ID_ENV, "31337"),
        ]))
        .unwrap();
        assert_eq!(config.expected_chain_id, 31337);
        assert_eq!(config.contract_address, Address::with_last_byte(0xaa));
    }

    #[test]
    fn test_malformed_chain_id() {
        let err = DeploymentConfig::from_lookup(lookup(&[(CHAIN_ID_ENV, "rinkeby")])).unwrap_err();
        assert_eq!(err.code(), "Config");
    }

    #[test]
    fn test_malformed_address() {
        let err =
            DeploymentConfig::from_lookup(lookup(&[(CONTRACT_ADDRESS_ENV, "0x1234")])).unwrap_err();
        assert_eq!(err.code(), "Config");
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(DeploymentConfig::new(Address::ZERO, 4).validate().is_err());
        assert!(DeploymentConfig::new(Address::with_last_byte(1), 0).validate().is_err());
    }
}
