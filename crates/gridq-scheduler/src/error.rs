//! Scheduler error types.

use thiserror::Error;

use gridq_core::ProviderError;

/// Result type alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that can occur while reconciling the worker fleet.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("unrecognized scheduler option `{field}`; supported options: {supported}")]
    UnrecognizedOption { field: String, supported: String },

    #[error("invalid value for scheduler option `{field}`: {value}")]
    InvalidOption { field: String, value: String },

    #[error("unknown scheduler `{kind}`; supported schedulers: {supported}")]
    UnknownScheduler { kind: String, supported: String },

    /// The convergence wait exhausted its deadline. Fatal: the queueing
    /// system needs operator attention, a retry will not fix it.
    #[error(
        "provider {provider}: PENDING/RUNNING job list has not refreshed \
         within {timeout_secs}s; fix the queue and restart the controller"
    )]
    ProviderUnresponsive { provider: String, timeout_secs: u64 },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
