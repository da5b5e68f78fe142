use super::{Color, Move, Square};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid piece type: {0}")]
    InvalidPieceType(String),

    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

/// Why the rules engine or the position store refused a move.
///
/// Never fatal: the selection layer recovers by returning to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejected {
    #[error("No piece on {0}")]
    EmptyOrigin(Square),

    #[error("The piece on {square} belongs to {color}, who is not on move")]
    NotSideToMove { square: Square, color: Color },

    #[error("{0} is not legal in this position")]
    Illegal(Move),

    #[error("{0} has a missing or unexpected promotion piece")]
    MalformedPromotion(Move),

    #[error("The game is over")]
    GameOver,
}
