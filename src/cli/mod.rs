pub mod app;
pub mod commands;
pub mod display;
pub mod input;

pub use app::{App, BoardConfig, Config, OpponentConfig};
pub use commands::{Cli, Commands, ConfigCommand};
pub use display::{display_board_view, display_order, render_board_view};
pub use input::{help_text, spawn_line_reader, InputError, InputParser, UserCommand};
