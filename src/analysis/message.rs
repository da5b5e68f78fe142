use super::error::MalformedResult;
use crate::chess::Fingerprint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One partial report from the analysis engine.
///
/// Scores are relative to the side to move, as UCI engines report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMessage {
    pub evaluation_centipawns: Option<i32>,
    pub mate_in: Option<i32>,
    pub principal_variation: Option<Vec<String>>,
    pub depth_reached: Option<u32>,
}

impl EngineMessage {
    pub fn is_empty(&self) -> bool {
        self.evaluation_centipawns.is_none()
            && self.mate_in.is_none()
            && self.principal_variation.is_none()
            && self.depth_reached.is_none()
    }
}

/// What the engine can say about one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Info(EngineMessage),
    /// Search finished; carries the engine's best move token when it had one
    BestMove(Option<String>),
    Failed(String),
}

/// An engine message tied to the position that requested it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub position_fingerprint: Fingerprint,
    pub evaluation_centipawns: Option<i32>,
    pub mate_in: Option<i32>,
    pub principal_variation: Option<Vec<String>>,
    pub depth_reached: Option<u32>,
}

impl AnalysisResult {
    pub fn new(position_fingerprint: Fingerprint, message: EngineMessage) -> Self {
        Self {
            position_fingerprint,
            evaluation_centipawns: message.evaluation_centipawns,
            mate_in: message.mate_in,
            principal_variation: message.principal_variation,
            depth_reached: message.depth_reached,
        }
    }
}

/// A classified line of UCI engine output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciLine {
    Info(EngineMessage),
    BestMove(Option<String>),
    Other,
}

/// Classify one line of UCI output.
///
/// `info` lines without depth, score or pv (currmove, string, hashfull...) are
/// `Other`; a recognised field with an unusable value is `MalformedResult`.
pub fn parse_uci_line(line: &str) -> Result<UciLine, MalformedResult> {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("info") => {}
        Some("bestmove") => {
            let best = tokens
                .next()
                .filter(|token| *token != "(none)" && *token != "0000")
                .map(str::to_string);
            return Ok(UciLine::BestMove(best));
        }
        _ => return Ok(UciLine::Other),
    }

    let mut message = EngineMessage::default();
    while let Some(token) = tokens.next() {
        match token {
            // Free text until end of line
            "string" => break,
            "depth" => message.depth_reached = Some(number(tokens.next(), "depth")?),
            "score" => match tokens.next() {
                Some("cp") => message.evaluation_centipawns = Some(number(tokens.next(), "cp")?),
                Some("mate") => message.mate_in = Some(number(tokens.next(), "mate")?),
                Some(other) => return Err(MalformedResult::UnknownScore(other.to_string())),
                None => return Err(MalformedResult::MissingValue { field: "score" }),
            },
            "pv" => {
                let line: Vec<String> = tokens.by_ref().map(str::to_string).collect();
                if line.is_empty() {
                    return Err(MalformedResult::MissingValue { field: "pv" });
                }
                message.principal_variation = Some(line);
            }
            _ => {}
        }
    }

    if message.is_empty() {
        Ok(UciLine::Other)
    } else {
        Ok(UciLine::Info(message))
    }
}

fn number<T: FromStr>(value: Option<&str>, field: &'static str) -> Result<T, MalformedResult> {
    let value = value.ok_or(MalformedResult::MissingValue { field })?;
    value.parse().map_err(|_| MalformedResult::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
