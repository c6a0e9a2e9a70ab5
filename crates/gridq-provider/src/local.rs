//! Local process provider.
//!
//! Runs jobs on the local machine: one OS process per worker, spawned
//! through the configured shell. There is no queue, so jobs never sit in
//! PENDING — they start executing on submission and disappear once every
//! worker process has exited. Cost is flat: locally there is nothing to
//! gain from splitting workers across jobs.

use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use async_trait::async_trait;
use gridq_core::{Job, JobId, JobState, Provider, ProviderError, ProviderResult};

/// Options accepted by the `local` provider registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Shell used to run submitted commands.
    pub shell: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }
}

#[derive(Debug)]
struct LocalJob {
    id: JobId,
    children: Vec<Child>,
}

/// Provider backed by local OS processes.
#[derive(Debug)]
pub struct LocalProvider {
    config: LocalConfig,
    inner: Mutex<LocalState>,
}

#[derive(Debug, Default)]
struct LocalState {
    jobs: Vec<LocalJob>,
    next_id: u64,
}

impl LocalProvider {
    pub fn new(config: LocalConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(LocalState::default()),
        }
    }

    /// Drop exited worker processes and jobs with no live workers left.
    fn reap(state: &mut LocalState) {
        for job in &mut state.jobs {
            job.children.retain_mut(|child| match child.try_wait() {
                Ok(None) => true,
                Ok(Some(_)) => false,
                Err(e) => {
                    warn!(error = %e, "could not poll worker process, dropping it");
                    false
                }
            });
        }
        state.jobs.retain(|job| !job.children.is_empty());
    }

    fn listed(state: &LocalState) -> Vec<Job> {
        state
            .jobs
            .iter()
            .map(|job| Job::new(job.id.clone(), JobState::Running, job.children.len() as u32))
            .collect()
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn workers(&self, state: Option<JobState>) -> ProviderResult<u32> {
        let mut inner = self.inner.lock().await;
        Self::reap(&mut inner);
        match state {
            Some(JobState::Pending) => Ok(0),
            _ => Ok(Self::listed(&inner).iter().map(|j| j.workers).sum()),
        }
    }

    async fn jobs(&self, states: &[JobState]) -> ProviderResult<Vec<Job>> {
        let mut inner = self.inner.lock().await;
        Self::reap(&mut inner);
        if states.contains(&JobState::Running) {
            Ok(Self::listed(&inner))
        } else {
            Ok(Vec::new())
        }
    }

    async fn cost(&self, _workers: u32) -> ProviderResult<f64> {
        Ok(1.0)
    }

    async fn submit(&self, cmd: &str, workers: u32) -> ProviderResult<()> {
        let mut children = Vec::with_capacity(workers as usize);
        for _ in 0..workers {
            let child = Command::new(&self.config.shell)
                .arg("-c")
                .arg(cmd)
                .spawn()
                .map_err(|e| {
                    ProviderError::Submit(format!("spawn `{cmd}` via {}: {e}", self.config.shell))
                })?;
            children.push(child);
        }

        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = format!("local-{}", inner.next_id);
        debug!(%id, workers, "local job started");
        inner.jobs.push(LocalJob { id, children });
        Ok(())
    }

    async fn kill(&self, ids: &[JobId]) -> ProviderResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut inner = self.inner.lock().await;
        for job in inner.jobs.iter_mut().filter(|j| ids.contains(&j.id)) {
            for child in &mut job.children {
                // Already-exited workers are reaped below, not an error.
                if let Err(e) = child.start_kill()
                    && e.kind() != std::io::ErrorKind::InvalidInput
                {
                    return Err(ProviderError::Kill(format!("job {}: {e}", job.id)));
                }
            }
        }
        for job in inner.jobs.iter_mut().filter(|j| ids.contains(&j.id)) {
            for child in &mut job.children {
                let _ = child.wait().await;
            }
            job.children.clear();
        }
        Self::reap(&mut inner);
        Ok(())
    }
}
