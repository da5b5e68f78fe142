use crate::chess::{Color, Square};
use crate::presentation::{BoardView, Highlight};
use std::fmt::Write;

/// Print a board view to stdout
pub fn display_board_view(view: &BoardView) {
    println!();
    print!("{}", render_board_view(view));
}

/// Render a board view as text.
///
/// `[P]` marks the selected piece, `·` a quiet destination and `(p)` a capture.
pub fn render_board_view(view: &BoardView) -> String {
    let mut out = String::new();
    let files: String = display_order(view.orientation)
        .iter()
        .take(8)
        .map(|square| format!(" {}  ", square.file_char()))
        .collect();

    let _ = writeln!(out, "  ┌───┬───┬───┬───┬───┬───┬───┬───┐");
    for (row, squares) in display_order(view.orientation).chunks(8).enumerate() {
        let rank = squares[0].rank_char();
        let _ = write!(out, "{} │", rank);
        for square in squares {
            let _ = write!(out, "{}│", cell(view, *square));
        }
        let _ = writeln!(out, " {}", rank);

        // Print separator (except after last rank)
        if row < 7 {
            let _ = writeln!(out, "  ├───┼───┼───┼───┼───┼───┼───┼───┤");
        }
    }
    let _ = writeln!(out, "  └───┴───┴───┴───┴───┴───┴───┴───┘");
    let _ = writeln!(out, "   {}", files.trim_end());

    let _ = writeln!(out, "{}", view.status_text);
    let _ = writeln!(
        out,
        "Eval: {}  Depth: {}",
        view.evaluation_text, view.depth_text
    );
    if let Some(arrow) = view.arrow {
        let _ = writeln!(out, "Best move: {}{}", arrow.from, arrow.to);
    }
    if !view.best_line.is_empty() {
        let _ = writeln!(out, "Line: {}", view.best_line);
    }
    out
}

/// Squares in the order the board prints them, top-left first
pub fn display_order(orientation: Color) -> Vec<Square> {
    let mut squares = Vec::with_capacity(64);
    for row in 0..8u8 {
        for column in 0..8u8 {
            let (file, rank) = match orientation {
                Color::White => (column, 7 - row),
                Color::Black => (7 - column, row),
            };
            squares.push(Square::new_unchecked(file, rank));
        }
    }
    squares
}

fn cell(view: &BoardView, square: Square) -> String {
    let symbol = view
        .pieces
        .get(&square)
        .map(|piece| piece.fen_char())
        .unwrap_or(' ');

    match view.highlights.get(&square) {
        Some(Highlight::Origin) => format!("[{}]", symbol),
        Some(Highlight::CaptureDestination) => format!("({})", symbol),
        Some(Highlight::QuietDestination) if symbol == ' ' => " · ".to_string(),
        Some(Highlight::QuietDestination) => format!("·{} ", symbol),
        None => format!(" {} ", symbol),
    }
}
