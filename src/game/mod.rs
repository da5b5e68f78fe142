pub use self::controller::{
    ControllerSettings, EventOutcome, GameController, GameEvent, IgnoreReason,
};
pub use self::opponent::{MoveSelectionStrategy, OpponentMover, RandomMover};
pub use self::selection::{
    destinations_from, Destination, PromotionPolicy, SelectionOutcome, SelectionState,
};
pub use self::store::{PlayedMove, PositionStore};

mod controller;
mod opponent;
mod selection;
mod store;
