//! UI Components

pub mod install_notice;
pub mod navbar;

pub use install_notice::InstallNotice;
pub use navbar::Navbar;
