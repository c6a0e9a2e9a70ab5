//! Domain types shared between the scheduler and providers.

use serde::{Deserialize, Serialize};

/// Identifier a provider assigns to a submitted job.
pub type JobId = String;

/// Lifecycle state of a job on the provider side.
///
/// Jobs absent from provider listings are implicitly completed; the
/// scheduler only ever reasons about queued and live jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Queued, waiting for resources.
    Pending,
    /// Executing.
    Running,
}

impl JobState {
    /// All states a job can be observed in.
    pub const ALL: [JobState; 2] = [JobState::Pending, JobState::Running];

    /// States counted as occupying queue capacity (pending or running).
    pub const ACTIVE: [JobState; 2] = [JobState::Pending, JobState::Running];
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "PENDING"),
            JobState::Running => write!(f, "RUNNING"),
        }
    }
}

/// A job as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Queue-assigned identifier. Freshly submitted jobs may not have one
    /// yet; such jobs cannot be cancelled.
    pub id: Option<JobId>,
    pub state: JobState,
    /// Workers attached to this job (a job may be a multi-worker
    /// allocation).
    pub workers: u32,
}

impl Job {
    pub fn new(id: impl Into<JobId>, state: JobState, workers: u32) -> Self {
        Self {
            id: Some(id.into()),
            state,
            workers,
        }
    }
}

/// Sum of workers across the given jobs.
pub fn total_workers(jobs: &[Job]) -> u32 {
    jobs.iter().map(|j| j.workers).sum()
}

/// Extract the ids of the given jobs, skipping jobs without one.
///
/// Used by the scheduler to snapshot the provider's bookkeeping; id order
/// follows job order (oldest-first as providers report them).
pub fn job_ids(jobs: &[Job]) -> Vec<JobId> {
    jobs.iter().filter_map(|j| j.id.clone()).collect()
}
