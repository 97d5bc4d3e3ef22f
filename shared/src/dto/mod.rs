//! # Data Transfer Objects (DTOs)
//!
//! - [`network`] - Network identity reported by the connected wallet

pub mod network;

pub use network::*;
