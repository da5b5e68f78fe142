//! Integration tests driving the game controller and the engine process end to end

pub mod controller_analysis;
pub mod uci_engine;
