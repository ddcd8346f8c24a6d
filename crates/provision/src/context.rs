//! Progress reporting
//!
//! The provisioner calls these hooks from worker threads, so implementations
//! must be thread-safe. This lets the crate stay free of any UI dependency.

use crate::types::{HostReport, Step};

/// Progress callback for provisioning runs
pub trait ProgressCallback: Send + Sync {
    /// Called once when a host's task starts
    fn on_host_start(&self, hostname: &str);

    /// Called before each step; `index` is 1-based
    fn on_step(&self, hostname: &str, index: usize, total: usize, step: &Step);

    /// Called once when a host's task finishes, successfully or not
    fn on_host_complete(&self, report: &HostReport);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_host_start(&self, _hostname: &str) {}
    fn on_step(&self, _hostname: &str, _index: usize, _total: usize, _step: &Step) {}
    fn on_host_complete(&self, _report: &HostReport) {}
}
