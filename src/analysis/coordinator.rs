use super::engine::{AnalysisEngine, AnalysisRequest, EngineStream};
use super::error::MalformedResult;
use super::message::{AnalysisResult, EngineEvent};
use crate::chess::{Color, Fingerprint, GameStatus, Position};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Engine output is shown in thousandths of a centipawn unit, as the board always has.
pub const EVALUATION_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Depth requested for every position
    pub target_depth: u32,
    /// Shallower reports are too noisy to show
    pub min_depth: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            target_depth: 18,
            min_depth: 10,
        }
    }
}

/// Generation of an analysis request. Two requests for the same position get
/// different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Everything the coordinator hears back from a subscription, stamped with the
/// request that produced it and that request's fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisUpdate {
    Result {
        request: RequestId,
        result: AnalysisResult,
    },
    Finished {
        request: RequestId,
        fingerprint: Fingerprint,
        best_move: Option<String>,
    },
    Failed {
        request: RequestId,
        fingerprint: Fingerprint,
        reason: String,
    },
}

impl AnalysisUpdate {
    pub fn request(&self) -> RequestId {
        match self {
            AnalysisUpdate::Result { request, .. }
            | AnalysisUpdate::Finished { request, .. }
            | AnalysisUpdate::Failed { request, .. } => *request,
        }
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        match self {
            AnalysisUpdate::Result { result, .. } => &result.position_fingerprint,
            AnalysisUpdate::Finished { fingerprint, .. }
            | AnalysisUpdate::Failed { fingerprint, .. } => fingerprint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Request sent, nothing usable yet
    Pending,
    /// At least one result accepted, search still running
    Running,
    Complete,
    /// Engine missing or dead; no evaluation is shown
    Unavailable,
    /// Terminal position, nothing to analyse
    GameOver,
}

/// What `on_result` did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    Accepted,
    /// Produced for a position that is no longer current
    Stale,
    /// No request is running
    Inactive,
    BelowMinDepth,
    /// Shallower than a result already shown for this request
    DepthRegressed,
    Malformed,
}

/// The analysis state a board may show, always for exactly one position.
///
/// Scores here are White-oriented: positive favours White.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayedAnalysis {
    pub fingerprint: Option<Fingerprint>,
    pub status: AnalysisStatus,
    pub evaluation_centipawns: Option<i32>,
    pub mate_in: Option<i32>,
    pub principal_variation: Vec<String>,
    pub depth: Option<u32>,
}

impl DisplayedAnalysis {
    fn empty(fingerprint: Option<Fingerprint>, status: AnalysisStatus) -> Self {
        Self {
            fingerprint,
            status,
            evaluation_centipawns: None,
            mate_in: None,
            principal_variation: Vec::new(),
            depth: None,
        }
    }

    /// Evaluation in display units; +50 from White's point of view is 0.05
    pub fn evaluation(&self) -> Option<f64> {
        self.evaluation_centipawns
            .map(|centipawns| f64::from(centipawns) / EVALUATION_SCALE)
    }

    /// Whether this analysis describes `position`
    pub fn describes(&self, position: &Position) -> bool {
        self.fingerprint.as_ref() == Some(position.fingerprint())
    }
}

impl Default for DisplayedAnalysis {
    fn default() -> Self {
        Self::empty(None, AnalysisStatus::Pending)
    }
}

/// Forwarding of one request's engine stream, keyed by request id and fingerprint.
///
/// Everything it forwards carries both, so a consumer can always tell which request
/// and which position a message belongs to.
pub struct Subscription {
    request: RequestId,
    fingerprint: Fingerprint,
    forwarder: JoinHandle<()>,
}

impl Subscription {
    pub fn spawn(
        request: RequestId,
        fingerprint: Fingerprint,
        mut stream: EngineStream,
        updates: mpsc::UnboundedSender<AnalysisUpdate>,
    ) -> Self {
        let key = fingerprint.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = stream.recv().await {
                let update = match event {
                    EngineEvent::Info(message) => AnalysisUpdate::Result {
                        request,
                        result: AnalysisResult::new(key.clone(), message),
                    },
                    EngineEvent::BestMove(best_move) => AnalysisUpdate::Finished {
                        request,
                        fingerprint: key.clone(),
                        best_move,
                    },
                    EngineEvent::Failed(reason) => AnalysisUpdate::Failed {
                        request,
                        fingerprint: key.clone(),
                        reason,
                    },
                };
                let done = !matches!(update, AnalysisUpdate::Result { .. });
                if updates.send(update).is_err() || done {
                    return;
                }
            }
            // The stream closed without a verdict: the engine went away mid-search.
            let _ = updates.send(AnalysisUpdate::Failed {
                request,
                fingerprint: key,
                reason: "analysis stream closed".to_string(),
            });
        });

        Self {
            request,
            fingerprint,
            forwarder,
        }
    }

    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn cancel(self) {
        self.forwarder.abort();
    }
}

struct ActiveRequest {
    subscription: Subscription,
    side_to_move: Color,
}

/// Keeps displayed analysis consistent with the current position.
pub struct AnalysisCoordinator {
    engine: Box<dyn AnalysisEngine>,
    settings: AnalysisSettings,
    updates: mpsc::UnboundedSender<AnalysisUpdate>,
    active: Option<ActiveRequest>,
    last_request: RequestId,
    displayed: DisplayedAnalysis,
}

impl AnalysisCoordinator {
    /// The receiver yields every update from every subscription; hand them back
    /// through `on_update`.
    pub fn new(
        engine: Box<dyn AnalysisEngine>,
        settings: AnalysisSettings,
    ) -> (Self, mpsc::UnboundedReceiver<AnalysisUpdate>) {
        let (updates, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            engine,
            settings,
            updates,
            active: None,
            last_request: RequestId(0),
            displayed: DisplayedAnalysis::default(),
        };
        (coordinator, receiver)
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn displayed(&self) -> &DisplayedAnalysis {
        &self.displayed
    }

    /// Fingerprint of the request results are currently accepted for
    pub fn active_fingerprint(&self) -> Option<&Fingerprint> {
        self.active
            .as_ref()
            .map(|active| active.subscription.fingerprint())
    }

    /// Id of the request results are currently accepted for
    pub fn active_request(&self) -> Option<RequestId> {
        self.active
            .as_ref()
            .map(|active| active.subscription.request())
    }

    /// Drop the previous request and analyse `position`, unless it is terminal.
    pub fn on_position_changed(&mut self, position: &Position, status: GameStatus) {
        self.engine.stop();
        if let Some(previous) = self.active.take() {
            debug!(
                "Cancelling analysis of {}",
                previous.subscription.fingerprint().digest()
            );
            previous.subscription.cancel();
        }

        let fingerprint = position.fingerprint().clone();
        if status.is_terminal() {
            info!("Game over ({}), analysis suspended", status);
            self.displayed = DisplayedAnalysis::empty(Some(fingerprint), AnalysisStatus::GameOver);
            return;
        }

        let request = AnalysisRequest {
            fingerprint: fingerprint.clone(),
            target_depth: self.settings.target_depth,
        };
        match self.engine.evaluate(&request) {
            Ok(stream) => {
                self.last_request = self.last_request.next();
                debug!(
                    "Analysing {} to depth {}",
                    fingerprint.digest(),
                    request.target_depth
                );
                self.active = Some(ActiveRequest {
                    subscription: Subscription::spawn(
                        self.last_request,
                        fingerprint.clone(),
                        stream,
                        self.updates.clone(),
                    ),
                    side_to_move: position.side_to_move(),
                });
                self.displayed = DisplayedAnalysis::empty(Some(fingerprint), AnalysisStatus::Pending);
            }
            Err(e) => {
                warn!("Analysis unavailable: {}", e);
                self.displayed =
                    DisplayedAnalysis::empty(Some(fingerprint), AnalysisStatus::Unavailable);
            }
        }
    }

    /// Merge one result into the displayed analysis if it is current and usable.
    pub fn on_result(&mut self, result: AnalysisResult) -> ResultDisposition {
        let Some(active) = self.active.as_ref() else {
            return ResultDisposition::Inactive;
        };
        if &result.position_fingerprint != active.subscription.fingerprint() {
            debug!(
                "Discarding result for superseded position {}",
                result.position_fingerprint.digest()
            );
            return ResultDisposition::Stale;
        }

        let Some(depth) = result.depth_reached else {
            debug!("Discarding result: {}", MalformedResult::MissingDepth);
            return ResultDisposition::Malformed;
        };
        if depth < self.settings.min_depth {
            return ResultDisposition::BelowMinDepth;
        }
        if self.displayed.depth.is_some_and(|shown| depth < shown) {
            return ResultDisposition::DepthRegressed;
        }

        let sign = active.side_to_move.sign();
        if let Some(centipawns) = result.evaluation_centipawns {
            self.displayed.evaluation_centipawns = Some(centipawns.saturating_mul(sign));
            self.displayed.mate_in = None;
        }
        if let Some(mate_in) = result.mate_in {
            self.displayed.mate_in = Some(mate_in.saturating_mul(sign));
        }
        if let Some(line) = result.principal_variation {
            self.displayed.principal_variation = line;
        }
        self.displayed.depth = Some(depth);
        if self.displayed.status == AnalysisStatus::Pending {
            self.displayed.status = AnalysisStatus::Running;
        }

        ResultDisposition::Accepted
    }

    /// Entry point for everything arriving on the update channel.
    ///
    /// An update counts only if it comes from the active request; output of an
    /// earlier request for the same position is as stale as any other.
    pub fn on_update(&mut self, update: AnalysisUpdate) -> ResultDisposition {
        let Some(active) = self.active.as_ref() else {
            return ResultDisposition::Inactive;
        };
        if update.request() != active.subscription.request()
            || update.fingerprint() != active.subscription.fingerprint()
        {
            debug!(
                "Discarding update of superseded request for {}",
                update.fingerprint().digest()
            );
            return ResultDisposition::Stale;
        }

        match update {
            AnalysisUpdate::Result { result, .. } => self.on_result(result),
            AnalysisUpdate::Finished { best_move, .. } => {
                debug!("Analysis finished, best move {:?}", best_move);
                self.displayed.status = AnalysisStatus::Complete;
                self.active = None;
                ResultDisposition::Accepted
            }
            AnalysisUpdate::Failed {
                fingerprint,
                reason,
                ..
            } => {
                warn!("Analysis failed: {}", reason);
                self.active = None;
                self.displayed = DisplayedAnalysis::empty(Some(fingerprint), AnalysisStatus::Unavailable);
                ResultDisposition::Accepted
            }
        }
    }
}
