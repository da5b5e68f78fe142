//! Unit tests for individual components

pub mod store;
pub mod uci_parsing;
