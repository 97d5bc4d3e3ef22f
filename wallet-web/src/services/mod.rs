//! Browser-side services

pub mod ethereum;
pub mod rpc;
