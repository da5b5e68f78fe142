//! Render-ready projection of game, selection and analysis state.

pub use self::projection::{
    can_drag, project, Arrow, BoardView, Highlight, ProjectionInput, BEST_LINE_PREVIEW,
};

mod projection;
