//! Error types for provisioning

use crate::types::Step;
use thiserror::Error;

/// A host's step sequence stopped at `step`
#[derive(Debug, Error)]
#[error("step `{step}` failed after {completed} completed step(s): {source}")]
pub struct StepFailure {
    /// The step that failed
    pub step: Step,
    /// Steps that succeeded before it
    pub completed: usize,
    #[source]
    pub source: remotekit::Error,
}

/// Errors that prevent a run from starting
#[derive(Debug, Error)]
pub enum Error {
    /// Worker pool could not be created
    #[error("failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for provisioning runs
pub type Result<T> = std::result::Result<T, Error>;
