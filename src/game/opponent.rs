use crate::chess::{Move, Position, RulesEngine};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

/// Picks the non-human side's move.
///
/// The random mover is a placeholder; anything that can choose among legal moves
/// (an engine-backed player, an opening book) plugs in here.
pub trait MoveSelectionStrategy: Send {
    fn select(&mut self, position: &Position, legal: &[Move]) -> Option<Move>;
}

/// Uniformly random choice among legal moves
pub struct RandomMover {
    rng: StdRng,
}

impl RandomMover {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of choices
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelectionStrategy for RandomMover {
    fn select(&mut self, _position: &Position, legal: &[Move]) -> Option<Move> {
        legal.choose(&mut self.rng).copied()
    }
}

pub struct OpponentMover {
    strategy: Box<dyn MoveSelectionStrategy>,
}

impl OpponentMover {
    pub fn new(strategy: Box<dyn MoveSelectionStrategy>) -> Self {
        Self { strategy }
    }

    /// The opponent's choice in `position`, or `None` when there is nothing legal to play
    pub fn move_for(&mut self, rules: &dyn RulesEngine, position: &Position) -> Option<Move> {
        let legal = rules.legal_moves(position);
        if legal.is_empty() {
            return None;
        }
        let choice = self.strategy.select(position, &legal)?;
        debug!("Opponent picked {} out of {} legal moves", choice, legal.len());
        Some(choice)
    }
}
