use serde::{Deserialize, Serialize};

/// Name used for chain ids that are not in [`KNOWN_NETWORKS`].
pub const UNKNOWN_NETWORK: &str = "unknown";

/// Chain ids and the short names wallets and explorers use for them.
pub const KNOWN_NETWORKS: &[(u64, &str)] = &[
    (1, "homestead"),
    (3, "ropsten"),
    (4, "rinkeby"),
    (5, "goerli"),
    (10, "optimism"),
    (42, "kovan"),
    (56, "bnb"),
    (100, "xdai"),
    (137, "matic"),
    (8453, "base"),
    (31337, "hardhat"),
    (42161, "arbitrum"),
    (11155111, "sepolia"),
];

/// Result of network introspection on a connected provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub chain_id: u64,
    pub name: String,
}

impl NetworkInfo {
    pub fn new(chain_id: u64, name: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
        }
    }

    /// Build the network for `chain_id`, naming it from [`KNOWN_NETWORKS`].
    pub fn from_chain_id(chain_id: u64) -> Self {
        Self::new(chain_id, known_network_name(chain_id))
    }
}

impl std::fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

/// Look up the short name of `chain_id`, or [`UNKNOWN_NETWORK`].
pub fn known_network_name(chain_id: u64) -> &'static str {
    KNOWN_NETWORKS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_NETWORK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_networks() {
        assert_eq!(known_network_name(1), "homestead");
        assert_eq!(known_network_name(4), "rinkeby");
        assert_eq!(known_network_name(999_999), UNKNOWN_NETWORK);
    }

    #[test]
    fn test_display() {
        assert_eq!(NetworkInfo::from_chain_id(4).to_string(), "rinkeby (4)");
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(NetworkInfo::from_chain_id(1)).unwrap();
        assert_eq!(json, serde_json::json!({ "chain_id": 1, "name": "homestead" }));
    }
}
