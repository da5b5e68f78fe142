use crate::chess::Color;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kibitz")]
#[command(about = "Play chess against a random mover with live engine analysis")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play a game in the terminal
    ///
    /// Type a square to click it, or a move such as e2e4 to drag a piece.
    /// The opponent replies with a random legal move; a UCI engine analyses
    /// every position if one can be started.
    ///
    /// Examples:
    ///   kibitz play
    ///   kibitz play --color black --seed 7
    ///   kibitz play --engine /usr/local/bin/stockfish --depth 22
    Play {
        /// Configuration file to use instead of the default one
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Path to a UCI engine executable
        #[arg(short, long)]
        engine: Option<PathBuf>,
        /// Analysis depth
        #[arg(short, long)]
        depth: Option<u32>,
        /// Colour you play: 'white' or 'black'
        #[arg(long)]
        color: Option<Color>,
        /// Seed for the random opponent
        #[arg(long)]
        seed: Option<u64>,
        /// Print each board view as a JSON line instead of drawing it
        #[arg(long)]
        json: bool,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the default configuration file path
    Path,
    /// Show the effective configuration
    Show,
}
