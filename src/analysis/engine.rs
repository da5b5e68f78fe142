use super::error::AnalysisError;
use super::message::EngineEvent;
use crate::chess::Fingerprint;
use tokio::sync::mpsc;

/// Stream of engine output for one request. It closes after `BestMove` or `Failed`.
pub type EngineStream = mpsc::UnboundedReceiver<EngineEvent>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub fingerprint: Fingerprint,
    pub target_depth: u32,
}

/// The asynchronous analysis-engine collaborator.
pub trait AnalysisEngine: Send {
    /// Start evaluating a position. Output arrives on the returned stream.
    fn evaluate(&mut self, request: &AnalysisRequest) -> Result<EngineStream, AnalysisError>;

    /// Ask the engine to stop the running search. A hint only: output of the
    /// stopped search may still arrive afterwards.
    fn stop(&mut self);
}

/// Stand-in used when no engine could be started.
#[derive(Debug, Clone)]
pub struct UnavailableEngine {
    reason: String,
}

impl UnavailableEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AnalysisEngine for UnavailableEngine {
    fn evaluate(&mut self, _request: &AnalysisRequest) -> Result<EngineStream, AnalysisError> {
        Err(AnalysisError::Unavailable(self.reason.clone()))
    }

    fn stop(&mut self) {}
}
