//! Background position analysis and the rules that keep its output current.

pub use self::coordinator::{
    AnalysisCoordinator, AnalysisSettings, AnalysisStatus, AnalysisUpdate, DisplayedAnalysis,
    RequestId, ResultDisposition, Subscription, EVALUATION_SCALE,
};
pub use self::engine::{AnalysisEngine, AnalysisRequest, EngineStream, UnavailableEngine};
pub use self::error::{AnalysisError, MalformedResult};
pub use self::message::{parse_uci_line, AnalysisResult, EngineEvent, EngineMessage, UciLine};
pub use self::uci::{EngineSettings, UciEngine};

mod coordinator;
mod engine;
mod error;
mod message;
mod uci;
