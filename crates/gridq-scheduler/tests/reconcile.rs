//! Multi-cycle reconciliation tests.
//!
//! Drives the scheduler through full decision cycles against the stub
//! provider: grow to target, hold steady, absorb target changes, and
//! recover from a queue whose listings trail its accepted submissions.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use gridq_core::{JobState, Provider};
use gridq_provider::{CostModel, StubProvider, create_provider};
use gridq_scheduler::{CostMinScheduler, SchedulerConfig, WorkerScheduler, create_scheduler};

fn controller(provider: Arc<StubProvider>, max_workers: u32) -> CostMinScheduler {
    CostMinScheduler::with_config(
        provider,
        SchedulerConfig {
            max_workers,
            timestep: 0,
            timeout: 5,
        },
    )
}

#[tokio::test]
async fn grow_then_hold_steady() {
    let provider = Arc::new(StubProvider::new(CostModel::Flat));
    let scheduler = controller(provider.clone(), 8);

    // First cycle fills the pool with one flat-cost job.
    assert_eq!(scheduler.schedule("run-task", Some(8)).await.unwrap(), 8);
    assert_eq!(provider.submissions(), vec![("run-task".to_string(), 8)]);

    // Subsequent cycles see a satisfied pool and do nothing.
    assert_eq!(scheduler.schedule("run-task", Some(8)).await.unwrap(), 0);
    assert_eq!(scheduler.schedule("run-task", Some(8)).await.unwrap(), 0);
    assert_eq!(provider.submissions().len(), 1);
}

#[tokio::test]
async fn target_drop_shrinks_then_target_rise_regrows() {
    let provider = Arc::new(StubProvider::new(CostModel::PerNode {
        workers_per_node: 2,
    }));
    let scheduler = controller(provider.clone(), 8);

    assert_eq!(scheduler.schedule("run-task", Some(6)).await.unwrap(), 6);
    // 6 workers at 2 per node arrive as three 2-worker jobs.
    assert_eq!(provider.submissions().len(), 3);

    // Target drops to 2: the two newest jobs are cancelled whole.
    assert_eq!(scheduler.schedule("run-task", Some(2)).await.unwrap(), -4);
    assert_eq!(
        provider.workers(Some(JobState::Pending)).await.unwrap(),
        2
    );

    // Target rises again: the gap is refilled under the ceiling.
    assert_eq!(scheduler.schedule("run-task", Some(5)).await.unwrap(), 3);
    assert_eq!(provider.workers(None).await.unwrap(), 5);
}

#[tokio::test]
async fn running_jobs_are_never_cancelled() {
    let provider = Arc::new(StubProvider::new(CostModel::Flat));
    provider.seed(JobState::Running, 4);
    provider.seed(JobState::Pending, 4);
    let scheduler = controller(provider.clone(), 10);

    // ntasks 1 against 4 pending: only pending jobs are candidates, and
    // the one pending job overshoots the excess of 3, so nothing goes.
    assert_eq!(scheduler.schedule("run-task", Some(1)).await.unwrap(), 0);
    assert_eq!(provider.workers(Some(JobState::Running)).await.unwrap(), 4);
    assert_eq!(provider.workers(Some(JobState::Pending)).await.unwrap(), 4);
}

#[tokio::test]
async fn lagging_queue_is_not_double_filled() {
    let provider = Arc::new(StubProvider::new(CostModel::Flat).with_refresh_lag(1));
    let scheduler = controller(provider.clone(), 4);

    // The convergence wait inside the first cycle outlasts the lag, so
    // the second cycle sees the real pending count and stays quiet.
    assert_eq!(scheduler.schedule("run-task", Some(4)).await.unwrap(), 4);
    assert_eq!(scheduler.schedule("run-task", Some(4)).await.unwrap(), 0);
    assert_eq!(provider.submissions().len(), 1);
}

#[tokio::test]
async fn registry_wires_a_working_controller() {
    let provider = create_provider("stub", &serde_json::Value::Null).unwrap();
    let overrides = HashMap::from([
        ("max_workers".to_string(), json!(3)),
        ("timestep".to_string(), json!(0)),
        ("timeout".to_string(), json!(5)),
    ]);
    let scheduler = create_scheduler("costmin", provider, &overrides).unwrap();

    assert_eq!(scheduler.schedule("run-task", None).await.unwrap(), 3);
    assert_eq!(scheduler.schedule("run-task", None).await.unwrap(), 0);
}

#[tokio::test]
async fn update_reshapes_later_cycles() {
    let provider = Arc::new(StubProvider::new(CostModel::Flat));
    let mut scheduler = controller(provider.clone(), 2);

    assert_eq!(scheduler.schedule("run-task", None).await.unwrap(), 2);

    scheduler
        .update(&HashMap::from([("max_workers".to_string(), json!(6))]))
        .unwrap();
    // The raised ceiling lets the default target grow the pool.
    assert_eq!(scheduler.schedule("run-task", None).await.unwrap(), 4);
    assert_eq!(provider.workers(None).await.unwrap(), 6);
}
