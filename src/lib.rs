pub mod analysis;
pub mod chess;
pub mod cli;
pub mod game;
pub mod presentation;

// Re-export key types for easy testing
pub use analysis::{AnalysisCoordinator, AnalysisEngine, DisplayedAnalysis, UciEngine};
pub use chess::{Move, Position, RulesEngine, Square, StandardRules};
pub use game::{GameController, GameEvent, PositionStore, SelectionState};
pub use presentation::{project, BoardView};
