pub use self::error::{ChessError, MoveRejected};
pub use self::moves::Move;
pub use self::piece::{Color, Piece, PieceType};
pub use self::position::{Fingerprint, Position, STARTING_FEN};
pub use self::rules::{DrawReason, GameStatus, RulesEngine, StandardRules};
pub use self::square::Square;

mod error;
mod moves;
mod piece;
mod position;
pub mod rules;
mod square;
