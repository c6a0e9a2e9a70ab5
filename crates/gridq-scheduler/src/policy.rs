//! The reconciliation policy.
//!
//! `CostMinScheduler` holds no per-job state: every cycle re-reads the
//! provider and reasons only about bounds, which is what lets it tolerate
//! a queue whose listings lag behind its own submit and kill calls.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info};

use gridq_core::types::job_ids;
use gridq_core::{JobId, JobState, Provider};

use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, SchedulerResult};

/// A worker-fleet scheduling policy.
#[async_trait]
pub trait WorkerScheduler: Send + Sync + std::fmt::Debug {
    /// Reconcile the pool toward `ntasks` concurrently active workers
    /// (`max_workers` when unspecified) and return the signed worker delta
    /// actually applied.
    async fn schedule(&self, cmd: &str, ntasks: Option<u32>) -> SchedulerResult<i64>;

    /// Apply named configuration overrides.
    fn update(&mut self, overrides: &HashMap<String, serde_json::Value>) -> SchedulerResult<()>;

    fn config(&self) -> &SchedulerConfig;
}

/// Scheduler that sizes each submission to minimize the provider's cost
/// function, within the `max_workers` ceiling.
#[derive(Debug)]
pub struct CostMinScheduler {
    provider: Arc<dyn Provider>,
    config: SchedulerConfig,
}

impl CostMinScheduler {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self::with_config(provider, SchedulerConfig::default())
    }

    pub fn with_config(provider: Arc<dyn Provider>, config: SchedulerConfig) -> Self {
        Self { provider, config }
    }

    /// Cancel whole pending jobs, newest first, until the excess is
    /// absorbed. Never kills past the observed excess: the pending list
    /// may be stale, so under-shrinking is safe and over-shrinking is not.
    async fn shrink(&self, excess: u32) -> SchedulerResult<i64> {
        let pending = self.provider.jobs(&[JobState::Pending]).await?;
        let mut tokill: Vec<JobId> = Vec::new();
        let mut nkill: u32 = 0;
        for job in pending.iter().rev() {
            // Jobs the queue has not yet identified cannot be cancelled.
            let Some(id) = &job.id else { continue };
            if nkill + job.workers > excess {
                break;
            }
            tokill.push(id.clone());
            nkill += job.workers;
        }
        self.provider.kill(&tokill).await?;
        if nkill > 0 {
            info!(workers = nkill, jobs = tokill.len(), "cancelled excess pending jobs");
        }
        Ok(-i64::from(nkill))
    }

    /// Submit cost-minimal jobs until `remaining` workers are spawned or
    /// the `max_workers` ceiling leaves no headroom, then wait for the
    /// queue to register them.
    async fn grow(&self, cmd: &str, remaining: u32) -> SchedulerResult<i64> {
        let total = self.provider.workers(None).await?;
        let headroom = i64::from(self.config.max_workers) - i64::from(total);
        let snapshot = job_ids(&self.provider.jobs(&JobState::ACTIVE).await?);

        let mut spawned: i64 = 0;
        loop {
            let target = i64::from(remaining).min(headroom) - spawned;
            if target <= 0 {
                break;
            }
            let workers = self.best_job_size(target as u32).await?;
            if workers == 0 {
                break;
            }
            self.provider.submit(cmd, workers).await?;
            debug!(workers, "submitted job");
            spawned += i64::from(workers);
        }

        if spawned > 0 {
            info!(workers = spawned, "spawned workers, waiting for the queue to list them");
            self.wait_for_refresh(&snapshot).await?;
        }
        Ok(spawned)
    }

    /// Scan candidate sizes `1..=limit` and keep the one minimizing cost.
    ///
    /// The `<=` comparison keeps the largest size among equal minima, so
    /// flat cost plateaus resolve to fewer, larger jobs. Tests pin this.
    async fn best_job_size(&self, limit: u32) -> SchedulerResult<u32> {
        let mut best_workers = 0;
        let mut best_cost = f64::INFINITY;
        for workers in 1..=limit {
            let cost = self.provider.cost(workers).await?;
            if cost <= best_cost {
                best_workers = workers;
                best_cost = cost;
            }
        }
        // A cost function returning NaN for every size selects nothing.
        Ok(best_workers)
    }

    /// Poll until the PENDING∪RUNNING id list differs from `snapshot`.
    async fn wait_for_refresh(&self, snapshot: &[JobId]) -> SchedulerResult<()> {
        let started = Instant::now();
        loop {
            let current = job_ids(&self.provider.jobs(&JobState::ACTIVE).await?);
            if current.as_slice() != snapshot {
                return Ok(());
            }
            if started.elapsed() >= self.config.wait_timeout() {
                return Err(SchedulerError::ProviderUnresponsive {
                    provider: self.provider.name().to_string(),
                    timeout_secs: self.config.timeout,
                });
            }
            debug!(timestep = self.config.timestep, "queue listing unchanged, waiting");
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }
}

#[async_trait]
impl WorkerScheduler for CostMinScheduler {
    async fn schedule(&self, cmd: &str, ntasks: Option<u32>) -> SchedulerResult<i64> {
        let ntasks = ntasks.unwrap_or(self.config.max_workers);
        let pending = self.provider.workers(Some(JobState::Pending)).await?;
        let remaining = i64::from(ntasks) - i64::from(pending);
        debug!(ntasks, pending, remaining, "reconciling");

        if remaining == 0 {
            return Ok(0);
        }
        if remaining < 0 {
            return self.shrink(remaining.unsigned_abs() as u32).await;
        }
        self.grow(cmd, remaining as u32).await
    }

    fn update(&mut self, overrides: &HashMap<String, serde_json::Value>) -> SchedulerResult<()> {
        self.config.update(overrides)
    }

    fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}
