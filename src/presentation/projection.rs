use crate::analysis::{AnalysisStatus, DisplayedAnalysis};
use crate::chess::{Color, GameStatus, Move, Piece, Position, Square};
use crate::game::SelectionState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Characters of the principal variation shown under the board
pub const BEST_LINE_PREVIEW: usize = 40;

const PLACEHOLDER: &str = "--";
const UNAVAILABLE: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    Origin,
    QuietDestination,
    CaptureDestination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrow {
    pub from: Square,
    pub to: Square,
}

/// Everything a projection reads
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInput<'a> {
    pub position: &'a Position,
    pub status: GameStatus,
    pub selection: &'a SelectionState,
    pub analysis: &'a DisplayedAnalysis,
    pub orientation: Color,
    pub human: Color,
}

/// Render-ready board data for the rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub fen: String,
    pub side_to_move: Color,
    pub orientation: Color,
    pub pieces: BTreeMap<Square, Piece>,
    pub highlights: BTreeMap<Square, Highlight>,
    pub arrow: Option<Arrow>,
    /// Squares the rendering surface may start a drag from
    pub draggable: BTreeSet<Square>,
    pub evaluation_text: String,
    pub depth_text: String,
    pub best_line: String,
    pub status_text: String,
}

/// Derive the board view. Holds no state: equal inputs give equal views.
pub fn project(input: &ProjectionInput<'_>) -> BoardView {
    let position = input.position;

    BoardView {
        fen: position.to_fen(),
        side_to_move: position.side_to_move(),
        orientation: input.orientation,
        pieces: position.pieces().collect(),
        highlights: highlights(position, input.selection),
        arrow: best_move_arrow(position, input.analysis),
        draggable: Square::all()
            .filter(|square| can_drag(position, input.status, *square, input.human))
            .collect(),
        evaluation_text: evaluation_text(position, input.analysis),
        depth_text: depth_text(position, input.analysis),
        best_line: best_line(position, input.analysis),
        status_text: status_text(position, input.status),
    }
}

/// Drag filter: only the human's own pieces, only on the human's turn, only while
/// the game is live.
pub fn can_drag(position: &Position, status: GameStatus, square: Square, human: Color) -> bool {
    !status.is_terminal()
        && position.side_to_move() == human
        && position
            .piece_at(square)
            .is_some_and(|piece| piece.color == human)
}

fn highlights(position: &Position, selection: &SelectionState) -> BTreeMap<Square, Highlight> {
    let mut map = BTreeMap::new();
    if let SelectionState::PieceSelected {
        square,
        destinations,
        fingerprint,
    } = selection
    {
        if fingerprint != position.fingerprint() {
            return map;
        }
        for destination in destinations {
            let tag = if destination.capture {
                Highlight::CaptureDestination
            } else {
                Highlight::QuietDestination
            };
            map.insert(destination.square, tag);
        }
        map.insert(*square, Highlight::Origin);
    }
    map
}

fn best_move_arrow(position: &Position, analysis: &DisplayedAnalysis) -> Option<Arrow> {
    if !analysis.describes(position) {
        return None;
    }
    let first = analysis.principal_variation.first()?;
    let mv: Move = first.parse().ok()?;
    Some(Arrow {
        from: mv.from,
        to: mv.to,
    })
}

fn evaluation_text(position: &Position, analysis: &DisplayedAnalysis) -> String {
    if !analysis.describes(position) {
        return PLACEHOLDER.to_string();
    }
    if analysis.status == AnalysisStatus::Unavailable {
        return UNAVAILABLE.to_string();
    }
    if let Some(mate_in) = analysis.mate_in {
        return format!("#{}", mate_in);
    }
    match analysis.evaluation() {
        Some(evaluation) => format!("{:+.2}", evaluation),
        None => PLACEHOLDER.to_string(),
    }
}

fn depth_text(position: &Position, analysis: &DisplayedAnalysis) -> String {
    match analysis.depth {
        Some(depth) if analysis.describes(position) => depth.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn best_line(position: &Position, analysis: &DisplayedAnalysis) -> String {
    if !analysis.describes(position) {
        return String::new();
    }
    analysis
        .principal_variation
        .join(" ")
        .chars()
        .take(BEST_LINE_PREVIEW)
        .collect()
}

fn status_text(position: &Position, status: GameStatus) -> String {
    if status.is_terminal() {
        let mut text = status.to_string();
        if let Some(first) = text.get(..1) {
            text = first.to_uppercase() + &text[1..];
        }
        text
    } else {
        format!("{} to move", position.side_to_move())
    }
}
