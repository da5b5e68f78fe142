use super::error::ChessError;
use super::piece::{Color, Piece};
use super::square::Square;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position as _};
use std::fmt;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Canonical serialisation of a position (FEN, en passant shown only when legal).
///
/// Two positions with equal fingerprints are the same position for every consumer
/// in this crate; analysis results are matched against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placement, side to move, castling and en passant: the part that decides repetition
    pub fn repetition_key(&self) -> String {
        self.0.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }

    /// Short hex digest for log lines
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hex::encode(&hash[..6])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable game position.
///
/// Accepted moves produce a new `Position`; nothing mutates one in place.
#[derive(Debug, Clone)]
pub struct Position {
    chess: Chess,
    fingerprint: Fingerprint,
}

impl Position {
    /// The standard starting position
    pub fn starting() -> Self {
        Self::from_chess(Chess::default())
    }

    /// Parse a position from FEN
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fen = fen.trim();
        if fen.is_empty() {
            return Err(ChessError::InvalidFen(
                "FEN string cannot be empty".to_string(),
            ));
        }

        let setup: Fen = fen
            .parse()
            .map_err(|e| ChessError::InvalidFen(format!("{fen}: {e}")))?;
        let chess: Chess = setup
            .into_position(CastlingMode::Standard)
            .map_err(|e| ChessError::InvalidFen(format!("{fen}: {e}")))?;

        Ok(Self::from_chess(chess))
    }

    pub(crate) fn from_chess(chess: Chess) -> Self {
        let fingerprint = Fingerprint(Fen::from_position(chess.clone(), EnPassantMode::Legal).to_string());
        Self { chess, fingerprint }
    }

    pub(crate) fn chess(&self) -> &Chess {
        &self.chess
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// FEN text, identical to the fingerprint
    pub fn to_fen(&self) -> String {
        self.fingerprint.0.clone()
    }

    pub fn side_to_move(&self) -> Color {
        self.chess.turn().into()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.chess
            .board()
            .piece_at(to_shakmaty_square(square))
            .map(Piece::from)
    }

    /// Every occupied square with its piece, a1 first
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |square| self.piece_at(square).map(|piece| (square, piece)))
    }

    pub fn fullmove_number(&self) -> u32 {
        self.chess.fullmoves().get()
    }

    /// Board as ASCII art from White's perspective, rank 8 on top
    pub fn to_ascii(&self) -> String {
        let mut result = String::new();
        result.push_str("  a b c d e f g h\n");

        for rank in (0..8u8).rev() {
            let rank_number = rank + 1;
            result.push_str(&format!("{rank_number} "));

            let row: Vec<String> = (0..8u8)
                .map(|file| match self.piece_at(Square::new_unchecked(file, rank)) {
                    Some(piece) => piece.to_string(),
                    None => ".".to_string(),
                })
                .collect();
            result.push_str(&row.join(" "));

            result.push_str(&format!(" {rank_number}\n"));
        }

        result.push_str("  a b c d e f g h");
        result
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for Position {}

pub(crate) fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(u32::from(square.index()))
}

pub(crate) fn from_shakmaty_square(square: shakmaty::Square) -> Square {
    Square::new_unchecked(square.file() as u8, square.rank() as u8)
}
