//! The resource provider contract.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::types::{Job, JobId, JobState};

/// A batch resource provider: the single shared mutable resource the
/// scheduler acts on.
///
/// Implementations manage the actual pool of jobs. The scheduler only
/// appends (submit) and removes (kill) through this interface and treats
/// the provider's reported state as the sole source of truth — nothing is
/// cached across decision cycles. Reported state may lag behind submit and
/// kill calls; consumers must reason about bounds, not exact equality.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Provider identity, used in operator-facing error messages.
    fn name(&self) -> &str;

    /// Number of workers in the given state, or across all states when
    /// `state` is `None`.
    async fn workers(&self, state: Option<JobState>) -> ProviderResult<u32>;

    /// Jobs matching any of the given states, oldest-first, with worker
    /// counts.
    async fn jobs(&self, states: &[JobState]) -> ProviderResult<Vec<Job>>;

    /// Estimated cost of running `workers` workers in a single job.
    ///
    /// Defined for `workers >= 1`. Only the relative ordering matters;
    /// lower is better.
    async fn cost(&self, workers: u32) -> ProviderResult<f64>;

    /// Enqueue one job executing `cmd` with the requested worker count.
    async fn submit(&self, cmd: &str, workers: u32) -> ProviderResult<()>;

    /// Cancel the given jobs. Must be a no-op for an empty list.
    async fn kill(&self, ids: &[JobId]) -> ProviderResult<()>;
}
