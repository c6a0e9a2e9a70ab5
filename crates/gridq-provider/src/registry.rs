//! Name-indexed provider construction.
//!
//! Providers are selected by a string tag (from config files or the CLI)
//! over a closed set; options are decoded into each provider's typed
//! config struct.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use gridq_core::{Provider, ProviderError, ProviderResult};

use crate::local::{LocalConfig, LocalProvider};
use crate::slurm::{SlurmConfig, SlurmProvider};
use crate::stub::{StubConfig, StubProvider};

/// Provider tags accepted by [`create_provider`].
pub const SUPPORTED_PROVIDERS: &[&str] = &["local", "slurm", "stub"];

/// Build a provider from its tag and a free-form options value.
///
/// `Null` options mean "all defaults". Unknown tags fail with an error
/// listing the supported set.
pub fn create_provider(
    kind: &str,
    options: &serde_json::Value,
) -> ProviderResult<Arc<dyn Provider>> {
    match kind {
        "local" => {
            let config: LocalConfig = decode(options)?;
            Ok(Arc::new(LocalProvider::new(config)))
        }
        "slurm" => {
            let config: SlurmConfig = decode(options)?;
            Ok(Arc::new(SlurmProvider::new(config)))
        }
        "stub" => {
            let config: StubConfig = decode(options)?;
            Ok(Arc::new(
                StubProvider::new(config.cost_model).with_refresh_lag(config.refresh_lag),
            ))
        }
        other => Err(ProviderError::UnknownProvider {
            kind: other.to_string(),
            supported: SUPPORTED_PROVIDERS.join(", "),
        }),
    }
}

fn decode<T: DeserializeOwned + Default>(options: &serde_json::Value) -> ProviderResult<T> {
    if options.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(options.clone()).map_err(|e| ProviderError::Options(e.to_string()))
}
