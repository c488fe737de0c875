//! Error types for analysis acquisition.

use thiserror::Error;

/// Analysis acquisition errors.
///
/// `Transport` is the only variant the poll loop retries; everything else
/// fails the provider attempt and hands control to the fallback chain.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("agent.market API key is required")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("agent.market did not return an instance id")]
    NoInstanceId,

    #[error("Unexpected chat payload for {instance_id}: {detail}")]
    UnexpectedPayload { instance_id: String, detail: String },

    #[error("Timed out waiting for provider response on instance {0}")]
    NoResponse(String),

    #[error("Provider response did not include a JSON payload")]
    NoJsonPayload,

    #[error("Provider response failed to parse: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No symbol snapshots available for analysis")]
    NoSnapshots,
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;
