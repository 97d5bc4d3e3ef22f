//! Page modules

pub mod status;
pub mod storage;

pub use status::StatusPage;
pub use storage::StoragePage;
