use std::path::PathBuf;
use thiserror::Error;

/// The analysis engine could not be started or stopped talking to us.
///
/// Recovered by showing no evaluation; the game stays playable.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Analysis unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to start engine {}: {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine handshake failed: {0}")]
    Handshake(String),

    #[error("Engine IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// An engine message that cannot be used; it is dropped, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedResult {
    #[error("'{field}' has no value")]
    MissingValue { field: &'static str },

    #[error("'{field}' value '{value}' is not a number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Unknown score kind '{0}'")]
    UnknownScore(String),

    #[error("Message reports no search depth")]
    MissingDepth,
}
