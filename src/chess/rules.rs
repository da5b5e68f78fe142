//! Rules adapter: legality queries and move application over a rules engine.

use super::error::MoveRejected;
use super::moves::Move;
use super::piece::{Color, PieceType};
use super::position::{from_shakmaty_square, to_shakmaty_square, Position};
use super::square::Square;
use serde::{Deserialize, Serialize};
use shakmaty::{File, Position as _};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Result of asking whether play can continue from a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    /// Terminal by any rule: no analysis and no opponent move follow.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => write!(f, "in progress"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Draw(DrawReason::InsufficientMaterial) => {
                write!(f, "draw by insufficient material")
            }
            GameStatus::Draw(DrawReason::FiftyMoveRule) => write!(f, "draw by fifty-move rule"),
            GameStatus::Draw(DrawReason::ThreefoldRepetition) => {
                write!(f, "draw by threefold repetition")
            }
        }
    }
}

/// The rules-engine collaborator.
///
/// Implementations answer for exactly the position they are handed and keep no
/// state of their own.
pub trait RulesEngine: Send + Sync {
    /// All legal moves, ordered by origin, destination and promotion
    fn legal_moves(&self, position: &Position) -> Vec<Move>;

    /// Legal moves of the piece on `square`, ordered by destination then promotion.
    /// Empty for an empty square or a piece of the side not on move.
    fn legal_moves_from(&self, position: &Position, square: Square) -> Vec<Move> {
        self.legal_moves(position)
            .into_iter()
            .filter(|mv| mv.from == square)
            .collect()
    }

    fn is_capture(&self, position: &Position, mv: &Move) -> bool;

    /// Apply `mv`, which must carry an explicit promotion piece when it promotes
    fn apply(&self, position: &Position, mv: &Move) -> Result<Position, MoveRejected>;

    /// Checkmate, stalemate and position-local draws. Repetition needs history and is
    /// left to the caller.
    fn status(&self, position: &Position) -> GameStatus;
}

/// Standard chess rules backed by `shakmaty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    pub fn new() -> Self {
        Self
    }

    fn legal_engine_moves(position: &Position) -> Vec<(Move, shakmaty::Move)> {
        let mut moves: Vec<(Move, shakmaty::Move)> = position
            .chess()
            .legal_moves()
            .iter()
            .filter_map(|m| convert_move(m).map(|mv| (mv, m.clone())))
            .collect();
        moves.sort_by(|a, b| a.0.cmp(&b.0));
        moves
    }

    /// Find the engine move matching a candidate, insisting on an exact promotion match
    fn resolve(position: &Position, mv: &Move) -> Result<shakmaty::Move, MoveRejected> {
        let piece = position
            .piece_at(mv.from)
            .ok_or(MoveRejected::EmptyOrigin(mv.from))?;
        if piece.color != position.side_to_move() {
            return Err(MoveRejected::NotSideToMove {
                square: mv.from,
                color: piece.color,
            });
        }

        let candidates: Vec<(Move, shakmaty::Move)> = Self::legal_engine_moves(position)
            .into_iter()
            .filter(|(legal, _)| legal.from == mv.from && legal.to == mv.to)
            .collect();

        if candidates.is_empty() {
            return Err(MoveRejected::Illegal(*mv));
        }

        candidates
            .into_iter()
            .find(|(legal, _)| legal.promotion == mv.promotion)
            .map(|(_, engine_move)| engine_move)
            .ok_or(MoveRejected::MalformedPromotion(*mv))
    }
}

impl RulesEngine for StandardRules {
    fn legal_moves(&self, position: &Position) -> Vec<Move> {
        Self::legal_engine_moves(position)
            .into_iter()
            .map(|(mv, _)| mv)
            .collect()
    }

    fn is_capture(&self, position: &Position, mv: &Move) -> bool {
        Self::resolve(position, mv)
            .map(|engine_move| engine_move.is_capture())
            .unwrap_or(false)
    }

    fn apply(&self, position: &Position, mv: &Move) -> Result<Position, MoveRejected> {
        let engine_move = Self::resolve(position, mv)?;
        let next = position
            .chess()
            .clone()
            .play(&engine_move)
            .map_err(|_| MoveRejected::Illegal(*mv))?;
        Ok(Position::from_chess(next))
    }

    fn status(&self, position: &Position) -> GameStatus {
        let chess = position.chess();
        if chess.is_checkmate() {
            GameStatus::Checkmate {
                winner: position.side_to_move().opposite(),
            }
        } else if chess.is_stalemate() {
            GameStatus::Stalemate
        } else if chess.is_insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if chess.halfmoves() >= 100 {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else {
            GameStatus::Ongoing
        }
    }
}

/// Engine move to board gesture terms. Castling becomes the king's two-square step.
fn convert_move(m: &shakmaty::Move) -> Option<Move> {
    match m {
        shakmaty::Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            let to = shakmaty::Square::from_coords(file, king.rank());
            Some(Move::new_unchecked(
                from_shakmaty_square(*king),
                from_shakmaty_square(to),
                None,
            ))
        }
        _ => {
            let from = m.from()?;
            Some(Move::new_unchecked(
                from_shakmaty_square(from),
                from_shakmaty_square(m.to()),
                m.promotion().map(PieceType::from),
            ))
        }
    }
}
