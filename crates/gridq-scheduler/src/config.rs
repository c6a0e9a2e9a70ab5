//! Scheduler configuration.
//!
//! Statically typed with documented defaults. Two override paths exist:
//! deserialization (config files, saved state) applies defaults first and
//! overlays whatever fields are present, so state saved by an older
//! version picks up defaults for fields it predates; `update` applies a
//! named-field map and rejects unknown names.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};

/// Option names accepted by [`SchedulerConfig::update`].
pub const RECOGNIZED_OPTIONS: &[&str] = &["max_workers", "timestep", "timeout"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ceiling on live workers across all active jobs.
    pub max_workers: u32,
    /// Seconds between polls of the provider during the convergence wait.
    pub timestep: u64,
    /// Seconds to wait for the provider's bookkeeping to register a change
    /// before declaring it unresponsive.
    pub timeout: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_workers: 1,
            timestep: 2,
            timeout: 120,
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.timestep)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Apply named overrides, coercing each value to the field's type.
    ///
    /// Unknown field names fail with an error listing the recognized set;
    /// values that cannot be coerced fail with an invalid-value error.
    pub fn update(
        &mut self,
        overrides: &HashMap<String, serde_json::Value>,
    ) -> SchedulerResult<()> {
        for (name, value) in overrides {
            match name.as_str() {
                "max_workers" => {
                    self.max_workers = coerce_integer(value)
                        .and_then(|v| u32::try_from(v).ok())
                        .ok_or_else(|| invalid(name, value))?;
                }
                "timestep" => {
                    self.timestep = coerce_integer(value).ok_or_else(|| invalid(name, value))?;
                }
                "timeout" => {
                    self.timeout = coerce_integer(value).ok_or_else(|| invalid(name, value))?;
                }
                other => {
                    return Err(SchedulerError::UnrecognizedOption {
                        field: other.to_string(),
                        supported: RECOGNIZED_OPTIONS.join(", "),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Best-effort coercion: integers, integral floats, numeric strings.
fn coerce_integer(value: &serde_json::Value) -> Option<u64> {
    if let Some(v) = value.as_u64() {
        return Some(v);
    }
    if let Some(f) = value.as_f64()
        && f >= 0.0
        && f.fract() == 0.0
        && f <= u64::MAX as f64
    {
        return Some(f as u64);
    }
    value.as_str().and_then(|s| s.trim().parse().ok())
}

fn invalid(field: &str, value: &serde_json::Value) -> SchedulerError {
    SchedulerError::InvalidOption {
        field: field.to_string(),
        value: value.to_string(),
    }
}
