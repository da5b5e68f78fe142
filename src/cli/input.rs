use crate::chess::{ChessError, Move};
use crate::game::GameEvent;
use regex::Regex;
use std::io::{BufRead, BufReader, Read};
use tokio::sync::mpsc;

/// Input line parse failure
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Unrecognised command '{0}'. Type 'help' for the list of commands.")]
    Unrecognised(String),

    #[error("Invalid move: {0}")]
    InvalidMove(#[from] ChessError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Event(GameEvent),
    Help,
    Quit,
    Empty,
}

/// Turns terminal lines into board gestures: a square is a click, a move is a drag.
pub struct InputParser {
    square: Regex,
    mv: Regex,
}

impl InputParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            square: Regex::new(r"^[a-h][1-8]$")?,
            mv: Regex::new(r"^([a-h][1-8])([a-h][1-8])[qrbn]?$")?,
        })
    }

    pub fn parse(&self, line: &str) -> Result<UserCommand, InputError> {
        let input = line.trim().to_lowercase();

        let command = match input.as_str() {
            "" => UserCommand::Empty,
            "help" | "?" => UserCommand::Help,
            "quit" | "exit" | "q" => UserCommand::Quit,
            "new" => UserCommand::Event(GameEvent::NewGame),
            "flip" => UserCommand::Event(GameEvent::FlipBoard),
            text if self.square.is_match(text) => {
                UserCommand::Event(GameEvent::SquareClicked(text.parse()?))
            }
            text if self.mv.is_match(text) => {
                // The promotion piece is chosen by the board's policy, not typed.
                let mv: Move = text.parse()?;
                UserCommand::Event(GameEvent::PieceDropped {
                    from: mv.from,
                    to: mv.to,
                })
            }
            _ => return Err(InputError::Unrecognised(line.trim().to_string())),
        };
        Ok(command)
    }
}

pub fn help_text() -> &'static str {
    "Commands:
  e2       click a square (select a piece, or move the selected piece there)
  e2e4     drag a piece from one square to another
  new      start a new game
  flip     turn the board around
  help     show this list
  quit     leave"
}

/// Read lines from `source` on a plain thread and hand them over a channel.
///
/// The thread is never joined: a read blocked on a terminal must not hold up the
/// runtime when the session ends.
pub fn spawn_line_reader<R>(source: R) -> mpsc::UnboundedReceiver<std::io::Result<String>>
where
    R: Read + Send + 'static,
{
    let (lines, receiver) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in BufReader::new(source).lines() {
            let failed = line.is_err();
            if lines.send(line).is_err() || failed {
                break;
            }
        }
    });
    receiver
}
