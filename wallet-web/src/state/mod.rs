//! Reactive state shared across pages

pub mod connection;
