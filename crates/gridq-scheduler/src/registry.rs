//! Name-indexed scheduler construction.

use std::collections::HashMap;
use std::sync::Arc;

use gridq_core::Provider;

use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, SchedulerResult};
use crate::policy::{CostMinScheduler, WorkerScheduler};

/// Scheduler tags accepted by [`create_scheduler`].
pub const SUPPORTED_SCHEDULERS: &[&str] = &["costmin"];

/// Build a scheduler from its tag, a provider handle, and named
/// configuration overrides.
pub fn create_scheduler(
    kind: &str,
    provider: Arc<dyn Provider>,
    overrides: &HashMap<String, serde_json::Value>,
) -> SchedulerResult<Box<dyn WorkerScheduler>> {
    match kind {
        "costmin" => {
            let mut config = SchedulerConfig::default();
            config.update(overrides)?;
            Ok(Box::new(CostMinScheduler::with_config(provider, config)))
        }
        other => Err(SchedulerError::UnknownScheduler {
            kind: other.to_string(),
            supported: SUPPORTED_SCHEDULERS.join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridq_provider::{CostModel, StubProvider};
    use serde_json::json;

    #[test]
    fn builds_costmin_with_overrides() {
        let provider = Arc::new(StubProvider::new(CostModel::Flat));
        let overrides = HashMap::from([("max_workers".to_string(), json!(8))]);
        let scheduler = create_scheduler("costmin", provider, &overrides).unwrap();
        assert_eq!(scheduler.config().max_workers, 8);
    }

    #[test]
    fn unknown_tag_lists_supported() {
        let provider = Arc::new(StubProvider::new(CostModel::Flat));
        let err = create_scheduler("fifo", provider, &HashMap::new()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("fifo"));
        assert!(message.contains("costmin"));
    }

    #[test]
    fn bad_override_surfaces_config_error() {
        let provider = Arc::new(StubProvider::new(CostModel::Flat));
        let overrides = HashMap::from([("foo".to_string(), json!(1))]);
        let err = create_scheduler("costmin", provider, &overrides).unwrap_err();
        assert!(matches!(err, SchedulerError::UnrecognizedOption { .. }));
    }
}
