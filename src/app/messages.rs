//! AppMessage enum for async communication within the application.

use crate::events::ServerEvent;
use crate::models::PredictionModel;

/// Messages received from async operations (event stream, backend calls)
#[derive(Debug, Clone)]
pub enum AppMessage {
    /// A server event arrived on the push stream
    Server(ServerEvent),
    /// The push stream ended or failed
    StreamClosed { reason: Option<String> },
    /// A speculative response request resolved
    PredictionResolved {
        generation: u64,
        result: Result<String, String>,
    },
    /// The prediction model catalog was fetched
    ModelsLoaded(Vec<PredictionModel>),
    /// A fire-and-forget backend call failed
    BackendCallFailed { context: String, error: String },
}
