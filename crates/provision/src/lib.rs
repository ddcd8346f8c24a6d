//! # Provision
//!
//! Parallel prerequisite installation across remote test nodes.
//!
//! Each host is handled by its own task: wait until the host writes its
//! readiness marker, then install the package set for the host's
//! package-manager family. All tasks run concurrently and are joined before
//! the run returns.
//!
//! ## Core Concepts
//!
//! - **Host**: hostname, [`PackageFamily`] and a [`remotekit::Remote`] capability
//! - **PackageCatalog**: ordered package lists per family, injected at construction
//! - **Step**: one planned remote action (readiness wait or command)
//! - **Provisioner**: fans out one task per host and aggregates a [`RunReport`]
//!
//! ## Example
//!
//! ```ignore
//! use provision::{Host, PackageCatalog, PackageFamily, Provisioner};
//! use remotekit::{Session, SshTarget};
//!
//! let hosts = vec![
//!     Host::new("node1", PackageFamily::Deb, Session::ssh("node1", SshTarget::new("10.0.0.5"))?),
//!     Host::new("node2", PackageFamily::Rpm, Session::ssh("node2", SshTarget::new("10.0.0.6"))?),
//! ];
//!
//! let report = Provisioner::new(PackageCatalog::default()).run(&hosts)?;
//! std::process::exit(report.exit_code());
//! ```
//!
//! ## Failure policy
//!
//! Per-host failures never cancel sibling hosts. Every host gets a
//! [`HostReport`]; [`RunReport::exit_code`] is `0` only when all hosts
//! completed.

pub mod context;
pub mod error;
pub mod executor;
pub mod host;
pub mod planner;
pub mod types;

// Re-export main types at crate root
pub use context::{NoProgress, ProgressCallback};
pub use error::{Error, Result, StepFailure};
pub use executor::Provisioner;
pub use host::Host;
pub use planner::plan;
pub use types::{
    HostOutcome, HostReport, PackageCatalog, PackageFamily, Readiness, RunReport, Step,
};
