use super::error::ChessError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the 64 board squares, a1 = 0 through h8 = 63.
///
/// The index is private; squares are built from validated coordinates or parsed
/// from algebraic notation, never sliced out of strings at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Result<Self, ChessError> {
        if file > 7 {
            return Err(ChessError::InvalidSquare(format!(
                "File must be 0-7, got {}",
                file
            )));
        }
        if rank > 7 {
            return Err(ChessError::InvalidSquare(format!(
                "Rank must be 0-7, got {}",
                rank
            )));
        }

        Ok(Self(rank * 8 + file))
    }

    /// Create a square without validation (for constants where bounds are known)
    pub const fn new_unchecked(file: u8, rank: u8) -> Self {
        Self(rank * 8 + file)
    }

    pub fn from_index(index: u8) -> Result<Self, ChessError> {
        if index > 63 {
            return Err(ChessError::InvalidSquare(format!(
                "Index must be 0-63, got {}",
                index
            )));
        }
        Ok(Self(index))
    }

    pub fn from_chars(file: char, rank: char) -> Result<Self, ChessError> {
        let file_lower = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file_lower) {
            return Err(ChessError::InvalidSquare(format!(
                "Invalid file '{}'. Must be a-h.",
                file
            )));
        }

        if !('1'..='8').contains(&rank) {
            return Err(ChessError::InvalidSquare(format!(
                "Invalid rank '{}'. Must be 1-8.",
                rank
            )));
        }

        Ok(Self::new_unchecked(file_lower as u8 - b'a', rank as u8 - b'1'))
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// 0-7 corresponding to a-h
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// 0-7 corresponding to 1-8
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    pub fn file_char(self) -> char {
        (self.file() + b'a') as char
    }

    pub fn rank_char(self) -> char {
        (self.rank() + b'1') as char
    }

    /// All squares, a1 first and h8 last
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => Self::from_chars(file, rank),
            _ => Err(ChessError::InvalidSquare(format!(
                "Square must be exactly 2 characters (e.g., 'e4'), got '{}'",
                s
            ))),
        }
    }
}

// Serialised as "e4" so squares can key JSON maps.
impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
