//! gridq-io — typed artifact files.
//!
//! Worker commands produce and consume artifacts on shared storage; this
//! crate gives the controller and its tooling a uniform way to read and
//! write them. Formats are selected by name through [`open_artifact`],
//! mirroring how providers and schedulers are selected in their crates.

pub mod artifact;
pub mod registry;

pub use artifact::{ArtifactError, ArtifactFile, ArtifactResult};
pub use registry::{SUPPORTED_FORMATS, discover, open_artifact};
