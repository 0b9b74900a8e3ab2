//! Data model for an apkdeploy run.
//!
//! Targets come out of reconciliation, metadata comes out of configuration,
//! results come back from the distribution service, and the outcome is what
//! gets published to the environment store. All other crates depend on these
//! types.

pub mod metadata;
pub mod outcome;
pub mod outputs;
pub mod target;

pub use metadata::UploadMetadata;
pub use outcome::{RunOutcome, RunStatus, UploadResult};
pub use target::UploadTarget;
