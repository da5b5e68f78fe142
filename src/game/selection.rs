//! Click-to-move and drag-to-move state machine.

use super::store::PositionStore;
use crate::chess::{Fingerprint, Move, MoveRejected, PieceType, Square};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A legal destination of the selected piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Destination {
    pub square: Square,
    pub capture: bool,
}

/// Which piece a pawn becomes when the UI did not ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionPolicy(pub PieceType);

impl Default for PromotionPolicy {
    fn default() -> Self {
        Self(PieceType::Queen)
    }
}

impl PromotionPolicy {
    /// Build the move for an origin/destination pair, adding the promotion piece only
    /// when the pair is a promoting move in the current position.
    pub fn complete(&self, store: &PositionStore, from: Square, to: Square) -> Move {
        let promotes = store
            .legal_moves_from(from)
            .iter()
            .any(|mv| mv.to == to && mv.is_promotion());
        Move::new_unchecked(from, to, promotes.then_some(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    PieceSelected {
        square: Square,
        destinations: Vec<Destination>,
        /// Position the destinations were computed for
        fingerprint: Fingerprint,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Still idle; the click selected nothing
    Unchanged,
    Selected {
        square: Square,
        destinations: Vec<Destination>,
    },
    /// A selection was dropped without a move
    Cleared,
    Moved(Move),
    Rejected(MoveRejected),
}

impl SelectionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionState::Idle)
    }

    pub fn selected_square(&self) -> Option<Square> {
        match self {
            SelectionState::Idle => None,
            SelectionState::PieceSelected { square, .. } => Some(*square),
        }
    }

    pub fn destinations(&self) -> &[Destination] {
        match self {
            SelectionState::Idle => &[],
            SelectionState::PieceSelected { destinations, .. } => destinations,
        }
    }

    pub fn reset(&mut self) {
        *self = SelectionState::Idle;
    }

    /// Handle a click on `square`.
    pub fn click(
        &mut self,
        store: &mut PositionStore,
        square: Square,
        policy: PromotionPolicy,
    ) -> SelectionOutcome {
        let previous = std::mem::take(self);

        let (origin, destinations) = match previous {
            SelectionState::PieceSelected {
                square: origin,
                destinations,
                fingerprint,
            } if &fingerprint == store.current_position().fingerprint() => (origin, destinations),
            SelectionState::PieceSelected { .. } => {
                debug!("Dropping selection computed for an earlier position");
                return self.select(store, square);
            }
            SelectionState::Idle => return self.select(store, square),
        };

        if destinations.iter().any(|d| d.square == square) {
            let mv = policy.complete(store, origin, square);
            return attempt(store, &mv);
        }

        match self.select(store, square) {
            SelectionOutcome::Unchanged => SelectionOutcome::Cleared,
            outcome => outcome,
        }
    }

    /// Handle a drag from `from` to `to`: one step from selected to moved, same rules
    /// as two clicks, and always idle afterwards.
    pub fn drop_piece(
        &mut self,
        store: &mut PositionStore,
        from: Square,
        to: Square,
        policy: PromotionPolicy,
    ) -> SelectionOutcome {
        self.reset();

        if from == to {
            return SelectionOutcome::Unchanged;
        }

        if !store.legal_moves_from(from).iter().any(|mv| mv.to == to) {
            debug!("Rejected drop {}{}", from, to);
            return SelectionOutcome::Rejected(MoveRejected::Illegal(Move::new_unchecked(
                from, to, None,
            )));
        }

        let mv = policy.complete(store, from, to);
        attempt(store, &mv)
    }

    fn select(&mut self, store: &PositionStore, square: Square) -> SelectionOutcome {
        let destinations = destinations_from(store, square);
        if destinations.is_empty() {
            *self = SelectionState::Idle;
            return SelectionOutcome::Unchanged;
        }

        debug!("Selected {} with {} destinations", square, destinations.len());
        *self = SelectionState::PieceSelected {
            square,
            destinations: destinations.clone(),
            fingerprint: store.current_position().fingerprint().clone(),
        };
        SelectionOutcome::Selected {
            square,
            destinations,
        }
    }
}

fn attempt(store: &mut PositionStore, mv: &Move) -> SelectionOutcome {
    match store.apply_move(mv) {
        Ok(_) => SelectionOutcome::Moved(*mv),
        Err(reason) => {
            debug!("Move {} rejected: {}", mv, reason);
            SelectionOutcome::Rejected(reason)
        }
    }
}

/// Sorted, de-duplicated destinations of the piece on `square`, computed fresh from
/// the store's current position.
pub fn destinations_from(store: &PositionStore, square: Square) -> Vec<Destination> {
    let mut destinations: Vec<Destination> = store
        .legal_moves_from(square)
        .iter()
        .map(|mv| Destination {
            square: mv.to,
            capture: store.is_capture(mv),
        })
        .collect();
    destinations.sort();
    destinations.dedup();
    destinations
}
