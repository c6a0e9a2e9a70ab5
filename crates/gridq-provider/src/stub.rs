//! In-memory stub provider.
//!
//! A deterministic queue used by tests, demos, and dry runs. Two knobs make
//! it useful beyond happy paths: the cost model shapes the scheduler's
//! job-sizing decisions, and `refresh_lag` delays the visibility of newly
//! submitted jobs to mimic a batch system whose bookkeeping trails its
//! accepted submissions.

use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use gridq_core::{Job, JobId, JobState, Provider, ProviderResult};

/// Cost of running `workers` workers in one job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostModel {
    /// Every job size costs the same: the scheduler packs all remaining
    /// workers into one job.
    #[default]
    Flat,
    /// Cost grows with worker count: the scheduler submits unit jobs.
    Linear,
    /// Cost is the node count `ceil(workers / workers_per_node)` — flat
    /// plateaus that resolve to the largest size fitting the node.
    PerNode { workers_per_node: u32 },
}

impl CostModel {
    pub fn cost(&self, workers: u32) -> f64 {
        match self {
            CostModel::Flat => 1.0,
            CostModel::Linear => f64::from(workers),
            CostModel::PerNode { workers_per_node } => {
                f64::from(workers.div_ceil((*workers_per_node).max(1)))
            }
        }
    }
}

/// Options accepted by the `stub` provider registry entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StubConfig {
    pub cost_model: CostModel,
    /// Number of `jobs()` queries before a newly submitted job becomes
    /// visible. Zero means submissions show up immediately.
    pub refresh_lag: u32,
}

#[derive(Debug)]
struct StubJob {
    job: Job,
    /// Remaining `jobs()` polls before this job is listed.
    visible_after: u32,
}

#[derive(Debug, Default)]
struct StubState {
    jobs: Vec<StubJob>,
    next_id: u64,
    submissions: Vec<(String, u32)>,
    killed: Vec<JobId>,
}

/// In-memory provider. Jobs are held in submission order.
#[derive(Debug)]
pub struct StubProvider {
    name: String,
    cost_model: CostModel,
    refresh_lag: u32,
    inner: Mutex<StubState>,
}

impl StubProvider {
    pub fn new(cost_model: CostModel) -> Self {
        Self {
            name: "stub".to_string(),
            cost_model,
            refresh_lag: 0,
            inner: Mutex::new(StubState::default()),
        }
    }

    pub fn with_refresh_lag(mut self, lag: u32) -> Self {
        self.refresh_lag = lag;
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StubState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a visible job in the given state; returns its id.
    pub fn seed(&self, state: JobState, workers: u32) -> JobId {
        let mut inner = self.state();
        inner.next_id += 1;
        let id = inner.next_id.to_string();
        inner.jobs.push(StubJob {
            job: Job::new(id.clone(), state, workers),
            visible_after: 0,
        });
        id
    }

    /// Seed a visible pending job that the queue has not yet assigned an
    /// id to. Such jobs cannot be killed.
    pub fn seed_unidentified(&self, workers: u32) {
        self.state().jobs.push(StubJob {
            job: Job {
                id: None,
                state: JobState::Pending,
                workers,
            },
            visible_after: 0,
        });
    }

    /// Commands and worker counts passed to `submit`, in call order.
    pub fn submissions(&self) -> Vec<(String, u32)> {
        self.state().submissions.clone()
    }

    /// Job ids passed to `kill`, in call order.
    pub fn killed(&self) -> Vec<JobId> {
        self.state().killed.clone()
    }

    fn visible_matching(state: &StubState, states: &[JobState]) -> Vec<Job> {
        state
            .jobs
            .iter()
            .filter(|j| j.visible_after == 0 && states.contains(&j.job.state))
            .map(|j| j.job.clone())
            .collect()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn workers(&self, state: Option<JobState>) -> ProviderResult<u32> {
        let inner = self.state();
        let states = match state {
            Some(s) => vec![s],
            None => JobState::ALL.to_vec(),
        };
        Ok(Self::visible_matching(&inner, &states)
            .iter()
            .map(|j| j.workers)
            .sum())
    }

    async fn jobs(&self, states: &[JobState]) -> ProviderResult<Vec<Job>> {
        let mut inner = self.state();
        let listed = Self::visible_matching(&inner, states);
        // Each listing advances the queue's bookkeeping by one refresh.
        for j in &mut inner.jobs {
            j.visible_after = j.visible_after.saturating_sub(1);
        }
        Ok(listed)
    }

    async fn cost(&self, workers: u32) -> ProviderResult<f64> {
        Ok(self.cost_model.cost(workers))
    }

    async fn submit(&self, cmd: &str, workers: u32) -> ProviderResult<()> {
        let mut inner = self.state();
        inner.next_id += 1;
        let id = inner.next_id.to_string();
        inner.submissions.push((cmd.to_string(), workers));
        let lag = self.refresh_lag;
        inner.jobs.push(StubJob {
            job: Job::new(id.clone(), JobState::Pending, workers),
            visible_after: lag,
        });
        debug!(%id, workers, "stub job queued");
        Ok(())
    }

    async fn kill(&self, ids: &[JobId]) -> ProviderResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut inner = self.state();
        inner.jobs.retain(|j| match &j.job.id {
            Some(id) => !ids.contains(id),
            None => true,
        });
        inner.killed.extend(ids.iter().cloned());
        debug!(count = ids.len(), "stub jobs killed");
        Ok(())
    }
}
