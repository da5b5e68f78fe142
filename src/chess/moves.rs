use super::error::ChessError;
use super::piece::PieceType;
use super::square::Square;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A move candidate: origin, destination and an optional promotion piece.
///
/// Castling is the king's two-square step (`e1g1`), matching UCI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    /// Create a new move with validation
    pub fn new(from: Square, to: Square, promotion: Option<PieceType>) -> Result<Self, ChessError> {
        if from == to {
            return Err(ChessError::InvalidMove(
                "Source and destination squares cannot be the same".to_string(),
            ));
        }

        if let Some(piece_type) = promotion {
            if matches!(piece_type, PieceType::King | PieceType::Pawn) {
                return Err(ChessError::InvalidMove(
                    "Cannot promote to King or Pawn".to_string(),
                ));
            }
        }

        Ok(Self {
            from,
            to,
            promotion,
        })
    }

    /// Create a move without validation (for internal use when validity is guaranteed)
    pub const fn new_unchecked(from: Square, to: Square, promotion: Option<PieceType>) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }

    pub fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    /// Same move with a different promotion choice
    pub fn with_promotion(self, promotion: Option<PieceType>) -> Self {
        Self { promotion, ..self }
    }
}

// UCI long algebraic notation: e2e4, e7e8q
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.uci_char())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(s.len() == 4 || s.len() == 5) {
            return Err(ChessError::InvalidMove(format!(
                "Invalid move format '{s}'. Expected 'e2e4', or 'e7e8q' for promotion."
            )));
        }

        let from = s[0..2].parse::<Square>()?;
        let to = s[2..4].parse::<Square>()?;
        let promotion = match s.get(4..5) {
            Some(letter) => Some(letter.parse::<PieceType>()?),
            None => None,
        };

        Self::new(from, to, promotion)
    }
}
