//! Error types for provider operations.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur while talking to a resource provider.
///
/// The scheduler has no basis for telling transient faults from permanent
/// ones, so these propagate to the caller unchanged.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("submit failed: {0}")]
    Submit(String),

    #[error("state query failed: {0}")]
    Query(String),

    #[error("kill failed: {0}")]
    Kill(String),

    #[error("unparseable queue output: {0}")]
    Parse(String),

    #[error("unknown provider `{kind}`; supported providers: {supported}")]
    UnknownProvider { kind: String, supported: String },

    #[error("invalid provider options: {0}")]
    Options(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
