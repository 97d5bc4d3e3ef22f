//! # Shared Types Library
//!
//! Plain data types and helpers used by both the connection core and the
//! browser front-end. Nothing here touches the wallet or the chain.
//!
//! ## Structure
//!
//! - **[`dto`]**: Data Transfer Objects
//!   - **[`dto::network`]**: Network identity (`chainId` + name) and the known-network table
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::format_address`]**: Format account addresses for display
//!   - **[`utils::truncate_address`]**: Truncate `0x` addresses with ellipsis
//!
//! ## Wire Format
//!
//! DTOs serialize with the default `serde` behavior (snake_case field names).
//!
//! ```rust
//! use shared::dto::network::NetworkInfo;
//! use shared::utils::truncate_address;
//!
//! let network = NetworkInfo::from_chain_id(4);
//! assert_eq!(network.name, "rinkeby");
//!
//! let display = truncate_address("0x1234567890123456789012345678901234567890");
//! assert_eq!(display, "0x1234...7890");
//! ```

pub mod dto;
pub mod utils;

pub use dto::*;
pub use utils::*;
