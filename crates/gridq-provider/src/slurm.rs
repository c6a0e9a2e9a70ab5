//! Slurm provider.
//!
//! Drives a Slurm queue through the standard CLI tools: `sbatch` for
//! submission, `squeue` for state queries, `scancel` for cancellation.
//! Jobs are tagged with a configurable job name so concurrent controllers
//! on the same account do not see each other's jobs.
//!
//! Cost is the node count a job would occupy: `ceil(workers /
//! tasks_per_node)`. Plateaus between node boundaries are intentional —
//! the scheduler resolves equal costs toward the largest worker count, so
//! submissions fill whole nodes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info};

use gridq_core::{Job, JobId, JobState, Provider, ProviderError, ProviderResult};

/// Options accepted by the `slurm` provider registry entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlurmConfig {
    /// Job name used to tag and filter this controller's jobs.
    pub job_name: String,
    /// Tasks one node can hold; determines the node-count cost model.
    pub tasks_per_node: u32,
    pub partition: Option<String>,
    pub qos: Option<String>,
    pub account: Option<String>,
    /// Slurm time limit, e.g. "02:00:00".
    pub time_limit: Option<String>,
}

impl Default for SlurmConfig {
    fn default() -> Self {
        Self {
            job_name: "gridq".to_string(),
            tasks_per_node: 64,
            partition: None,
            qos: None,
            account: None,
            time_limit: None,
        }
    }
}

/// Provider backed by a Slurm batch queue.
#[derive(Debug)]
pub struct SlurmProvider {
    config: SlurmConfig,
}

impl SlurmProvider {
    pub fn new(config: SlurmConfig) -> Self {
        Self { config }
    }

    async fn squeue(&self) -> ProviderResult<Vec<Job>> {
        let output = run(
            Command::new("squeue")
                .arg("--noheader")
                .arg("--name")
                .arg(&self.config.job_name)
                .arg("--format=%i|%t|%C")
                .arg("--sort=i"),
        )
        .await
        .map_err(ProviderError::Query)?;
        parse_squeue_output(&output)
    }
}

#[async_trait]
impl Provider for SlurmProvider {
    fn name(&self) -> &str {
        "slurm"
    }

    async fn workers(&self, state: Option<JobState>) -> ProviderResult<u32> {
        let jobs = self.squeue().await?;
        Ok(jobs
            .iter()
            .filter(|j| state.is_none_or(|s| j.state == s))
            .map(|j| j.workers)
            .sum())
    }

    async fn jobs(&self, states: &[JobState]) -> ProviderResult<Vec<Job>> {
        let mut jobs = self.squeue().await?;
        jobs.retain(|j| states.contains(&j.state));
        Ok(jobs)
    }

    async fn cost(&self, workers: u32) -> ProviderResult<f64> {
        Ok(f64::from(
            workers.div_ceil(self.config.tasks_per_node.max(1)),
        ))
    }

    async fn submit(&self, cmd: &str, workers: u32) -> ProviderResult<()> {
        let args = sbatch_args(&self.config, cmd, workers);
        let mut command = Command::new("sbatch");
        command.args(&args);
        let output = run(&mut command).await.map_err(ProviderError::Submit)?;
        let id = parse_sbatch_output(&output)?;
        info!(%id, workers, "slurm job submitted");
        Ok(())
    }

    async fn kill(&self, ids: &[JobId]) -> ProviderResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut command = Command::new("scancel");
        command.args(ids);
        run(&mut command).await.map_err(ProviderError::Kill)?;
        debug!(count = ids.len(), "slurm jobs cancelled");
        Ok(())
    }
}

/// Build the sbatch argument list for one submission.
fn sbatch_args(config: &SlurmConfig, cmd: &str, workers: u32) -> Vec<String> {
    let mut args = vec![
        "--parsable".to_string(),
        format!("--job-name={}", config.job_name),
        format!("--ntasks={workers}"),
    ];
    if let Some(partition) = &config.partition {
        args.push(format!("--partition={partition}"));
    }
    if let Some(qos) = &config.qos {
        args.push(format!("--qos={qos}"));
    }
    if let Some(account) = &config.account {
        args.push(format!("--account={account}"));
    }
    if let Some(time_limit) = &config.time_limit {
        args.push(format!("--time={time_limit}"));
    }
    args.push(format!("--wrap={cmd}"));
    args
}

/// Map a squeue state code onto a tracked job state.
///
/// States past completion (CD, F, CA, TO, ...) are not tracked; completing
/// jobs still hold resources and count as running.
fn parse_state_code(code: &str) -> Option<JobState> {
    match code {
        "PD" => Some(JobState::Pending),
        "R" | "CG" => Some(JobState::Running),
        _ => None,
    }
}

/// Parse one `%i|%t|%C` squeue line. Untracked states yield `None`.
fn parse_squeue_line(line: &str) -> ProviderResult<Option<Job>> {
    let mut fields = line.split('|');
    let (Some(id), Some(code), Some(cpus)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ProviderError::Parse(format!("squeue line `{line}`")));
    };
    let Some(state) = parse_state_code(code.trim()) else {
        return Ok(None);
    };
    let workers = cpus
        .trim()
        .parse::<u32>()
        .map_err(|_| ProviderError::Parse(format!("cpu count in squeue line `{line}`")))?;
    Ok(Some(Job::new(id.trim(), state, workers)))
}

fn parse_squeue_output(output: &str) -> ProviderResult<Vec<Job>> {
    let mut jobs = Vec::new();
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        if let Some(job) = parse_squeue_line(line)? {
            jobs.push(job);
        }
    }
    Ok(jobs)
}

/// Extract the job id from `sbatch --parsable` output (`id[;cluster]`).
fn parse_sbatch_output(output: &str) -> ProviderResult<JobId> {
    let id = output.trim().split(';').next().unwrap_or("").to_string();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return Err(ProviderError::Parse(format!("sbatch output `{}`", output.trim())));
    }
    Ok(id)
}

/// Run a queue tool to completion, returning stdout or the failure text.
async fn run(command: &mut Command) -> Result<String, String> {
    let output = command
        .output()
        .await
        .map_err(|e| format!("{:?}: {e}", command.as_std().get_program()))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "{:?} exited with {}: {}",
            command.as_std().get_program(),
            output.status,
            stderr.trim()
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sbatch_args_minimal() {
        let args = sbatch_args(&SlurmConfig::default(), "echo hi", 4);
        assert_eq!(
            args,
            vec![
                "--parsable",
                "--job-name=gridq",
                "--ntasks=4",
                "--wrap=echo hi",
            ]
        );
    }

    #[test]
    fn sbatch_args_full() {
        let config = SlurmConfig {
            partition: Some("debug".to_string()),
            qos: Some("regular".to_string()),
            account: Some("proj".to_string()),
            time_limit: Some("01:30:00".to_string()),
            ..SlurmConfig::default()
        };
        let args = sbatch_args(&config, "run.sh", 2);
        assert!(args.contains(&"--partition=debug".to_string()));
        assert!(args.contains(&"--qos=regular".to_string()));
        assert!(args.contains(&"--account=proj".to_string()));
        assert!(args.contains(&"--time=01:30:00".to_string()));
        assert_eq!(args.last().unwrap(), "--wrap=run.sh");
    }

    #[test]
    fn squeue_lines_parse_tracked_states() {
        let job = parse_squeue_line("123|PD|8").unwrap().unwrap();
        assert_eq!(job, Job::new("123", JobState::Pending, 8));

        let job = parse_squeue_line("124|R|64").unwrap().unwrap();
        assert_eq!(job.state, JobState::Running);

        // Completing jobs still hold resources.
        let job = parse_squeue_line("125|CG|4").unwrap().unwrap();
        assert_eq!(job.state, JobState::Running);
    }

    #[test]
    fn squeue_untracked_states_are_skipped() {
        assert!(parse_squeue_line("126|CD|4").unwrap().is_none());
        let jobs = parse_squeue_output("1|PD|2\n2|CD|4\n3|R|8\n").unwrap();
        assert_eq!(jobs.len(), 2);
    }

    #[test]
    fn squeue_garbage_is_a_parse_error() {
        assert!(matches!(
            parse_squeue_line("no-fields-here"),
            Err(ProviderError::Parse(_))
        ));
        assert!(matches!(
            parse_squeue_line("123|PD|lots"),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn sbatch_output_parses_parsable_format() {
        assert_eq!(parse_sbatch_output("4242\n").unwrap(), "4242");
        assert_eq!(parse_sbatch_output("4242;cluster1\n").unwrap(), "4242");
        assert!(matches!(
            parse_sbatch_output("sbatch: error\n"),
            Err(ProviderError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn node_count_cost_has_plateaus() {
        let provider = SlurmProvider::new(SlurmConfig {
            tasks_per_node: 4,
            ..SlurmConfig::default()
        });
        assert_eq!(provider.cost(1).await.unwrap(), provider.cost(4).await.unwrap());
        assert!(provider.cost(5).await.unwrap() > provider.cost(4).await.unwrap());
    }
}
