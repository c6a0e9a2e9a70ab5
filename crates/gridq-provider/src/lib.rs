//! gridq-provider — resource provider implementations.
//!
//! Implements the `Provider` contract from `gridq-core` against three
//! backends:
//!
//! - [`SlurmProvider`] — drives a Slurm queue through `sbatch`, `squeue`,
//!   and `scancel`
//! - [`LocalProvider`] — runs jobs as local OS processes, one process per
//!   worker
//! - [`StubProvider`] — deterministic in-memory queue for tests, demos,
//!   and dry runs, with a configurable cost model and refresh lag
//!
//! Providers are selected by name through [`create_provider`].

pub mod local;
pub mod registry;
pub mod slurm;
pub mod stub;

pub use local::LocalProvider;
pub use registry::{SUPPORTED_PROVIDERS, create_provider};
pub use slurm::{SlurmConfig, SlurmProvider};
pub use stub::{CostModel, StubConfig, StubProvider};
