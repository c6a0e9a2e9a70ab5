//! gridq-scheduler — worker-fleet reconciliation policy.
//!
//! One operation: given a command and a target task count, decide how many
//! workers to add or remove right now, act on the provider, and return the
//! signed delta actually applied. The scheduler is stateless between
//! calls — the provider's reported state is re-read every cycle and is the
//! sole source of truth.
//!
//! # Control flow
//!
//! ```text
//! schedule(cmd, ntasks)
//!   ├── remaining = ntasks - pending
//!   ├── remaining == 0 → 0
//!   ├── remaining < 0  → cancel newest pending jobs, whole jobs only,
//!   │                    never beyond the observed excess → -nkill
//!   └── remaining > 0  → greedily submit cost-minimal jobs up to the
//!                        max_workers ceiling, then poll until the queue's
//!                        PENDING∪RUNNING listing registers the change
//!                        (provider-unresponsive error after `timeout`)
//! ```
//!
//! Not reentrant-safe for concurrent calls against one provider; run one
//! controller per logical queue.

pub mod config;
pub mod error;
pub mod policy;
pub mod registry;

pub use config::{RECOGNIZED_OPTIONS, SchedulerConfig};
pub use error::{SchedulerError, SchedulerResult};
pub use policy::{CostMinScheduler, WorkerScheduler};
pub use registry::{SUPPORTED_SCHEDULERS, create_scheduler};
