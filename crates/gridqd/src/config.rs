//! gridq.toml configuration parser.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use gridq_scheduler::SchedulerConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GridqConfig {
    pub scheduler: SchedulerSection,
    pub provider: ProviderSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSection {
    /// Scheduler tag (see gridq-scheduler's registry).
    pub kind: String,
    #[serde(flatten)]
    pub config: SchedulerConfig,
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            kind: "costmin".to_string(),
            config: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// Provider tag (see gridq-provider's registry).
    pub kind: String,
    /// Free-form options forwarded to the provider's config struct.
    pub options: Option<toml::Value>,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            kind: "local".to_string(),
            options: None,
        }
    }
}

impl GridqConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GridqConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Provider options as a JSON value for the provider registry.
    pub fn provider_options(&self) -> anyhow::Result<serde_json::Value> {
        match &self.provider.options {
            Some(value) => Ok(serde_json::to_value(value)?),
            None => Ok(serde_json::Value::Null),
        }
    }

    /// Scheduler config as named overrides for the scheduler registry.
    pub fn scheduler_overrides(&self) -> HashMap<String, serde_json::Value> {
        HashMap::from([
            (
                "max_workers".to_string(),
                serde_json::json!(self.scheduler.config.max_workers),
            ),
            (
                "timestep".to_string(),
                serde_json::json!(self.scheduler.config.timestep),
            ),
            (
                "timeout".to_string(),
                serde_json::json!(self.scheduler.config.timeout),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal() {
        let config: GridqConfig = toml::from_str("").unwrap();
        assert_eq!(config.scheduler.kind, "costmin");
        assert_eq!(config.scheduler.config.max_workers, 1);
        assert_eq!(config.provider.kind, "local");
    }

    #[test]
    fn parse_full() {
        let config: GridqConfig = toml::from_str(
            r#"
[scheduler]
kind = "costmin"
max_workers = 16
timestep = 5

[provider]
kind = "slurm"

[provider.options]
job_name = "fleet"
tasks_per_node = 128
"#,
        )
        .unwrap();
        assert_eq!(config.scheduler.config.max_workers, 16);
        assert_eq!(config.scheduler.config.timestep, 5);
        // Omitted fields keep their defaults.
        assert_eq!(config.scheduler.config.timeout, 120);
        assert_eq!(config.provider.kind, "slurm");

        let options = config.provider_options().unwrap();
        assert_eq!(options["tasks_per_node"], 128);
    }
}
