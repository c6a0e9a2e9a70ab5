//! gridq-core — domain types and the resource provider contract.
//!
//! A *provider* is an external resource manager (an HPC batch queue, the
//! local machine, an in-memory stub) that submits, runs, and reports on
//! jobs. Each job carries one or more *workers* — units of execution
//! capacity (e.g. MPI ranks). The scheduler in `gridq-scheduler` consumes
//! this contract and nothing else: all job state lives on the provider
//! side, and every decision cycle re-reads it.

pub mod error;
pub mod provider;
pub mod types;

pub use error::{ProviderError, ProviderResult};
pub use provider::Provider;
pub use types::{Job, JobId, JobState};
