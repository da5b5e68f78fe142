use crate::chess::{
    DrawReason, Fingerprint, GameStatus, Move, MoveRejected, Position, RulesEngine, Square,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// One accepted move together with the fingerprints on either side of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayedMove {
    pub mv: Move,
    pub before: Fingerprint,
    pub after: Fingerprint,
}

/// The single source of truth for the current position and move history.
pub struct PositionStore {
    rules: Arc<dyn RulesEngine>,
    initial: Position,
    current: Position,
    history: Vec<PlayedMove>,
    published: watch::Sender<Position>,
}

impl PositionStore {
    /// Store starting from the standard initial position
    pub fn new(rules: Arc<dyn RulesEngine>) -> Self {
        Self::with_position(rules, Position::starting())
    }

    pub fn with_position(rules: Arc<dyn RulesEngine>, position: Position) -> Self {
        let (published, _) = watch::channel(position.clone());
        Self {
            rules,
            initial: position.clone(),
            current: position,
            history: Vec::new(),
            published,
        }
    }

    pub fn current_position(&self) -> &Position {
        &self.current
    }

    pub fn rules(&self) -> &Arc<dyn RulesEngine> {
        &self.rules
    }

    pub fn history(&self) -> &[PlayedMove] {
        &self.history
    }

    /// Validate and apply `mv` against the current position.
    ///
    /// On success the stored position is replaced and subscribers see the new one;
    /// on failure nothing changes.
    pub fn apply_move(&mut self, mv: &Move) -> Result<&Position, MoveRejected> {
        if self.status().is_terminal() {
            return Err(MoveRejected::GameOver);
        }

        let next = self.rules.apply(&self.current, mv)?;
        debug!(
            "Applied {} ({} -> {})",
            mv,
            self.current.fingerprint().digest(),
            next.fingerprint().digest()
        );

        self.history.push(PlayedMove {
            mv: *mv,
            before: self.current.fingerprint().clone(),
            after: next.fingerprint().clone(),
        });
        self.current = next;
        self.published.send_replace(self.current.clone());

        Ok(&self.current)
    }

    /// Terminal state of the current position, repetition included
    pub fn status(&self) -> GameStatus {
        match self.rules.status(&self.current) {
            GameStatus::Ongoing if self.repetition_count() >= 3 => {
                GameStatus::Draw(DrawReason::ThreefoldRepetition)
            }
            status => status,
        }
    }

    /// How many times the current position has occurred, counting the current one
    pub fn repetition_count(&self) -> usize {
        let key = self.current.fingerprint().repetition_key();
        std::iter::once(self.initial.fingerprint())
            .chain(self.history.iter().map(|played| &played.after))
            .filter(|fingerprint| fingerprint.repetition_key() == key)
            .count()
    }

    pub fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.rules.legal_moves_from(&self.current, square)
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.rules.legal_moves(&self.current)
    }

    pub fn is_capture(&self, mv: &Move) -> bool {
        self.rules.is_capture(&self.current, mv)
    }

    /// Receiver that observes every position the store publishes
    pub fn subscribe(&self) -> watch::Receiver<Position> {
        self.published.subscribe()
    }

    /// Back to the initial position with an empty history
    pub fn reset(&mut self) {
        info!("Resetting game to {}", self.initial.fingerprint());
        self.current = self.initial.clone();
        self.history.clear();
        self.published.send_replace(self.current.clone());
    }
}
