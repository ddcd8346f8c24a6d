//! Core types for node provisioning

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Packaging ecosystem of a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFamily {
    /// Debian/Ubuntu, installs with apt-get
    Deb,
    /// RHEL/CentOS/Fedora, installs with yum
    Rpm,
}

impl PackageFamily {
    /// Short name used in inventories and reports
    pub fn name(&self) -> &'static str {
        match self {
            Self::Deb => "deb",
            Self::Rpm => "rpm",
        }
    }
}

impl fmt::Display for PackageFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ordered package lists per family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageCatalog {
    packages: BTreeMap<PackageFamily, Vec<String>>,
}

impl Default for PackageCatalog {
    fn default() -> Self {
        Self::new()
            .with_packages(PackageFamily::Deb, ["wget", "git", "python-virtualenv"])
            .with_packages(
                PackageFamily::Rpm,
                ["wget", "git", "redhat-lsb", "python-virtualenv"],
            )
    }
}

impl PackageCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self {
            packages: BTreeMap::new(),
        }
    }

    /// Set the package list for a family, replacing any previous list
    pub fn with_packages<I, S>(mut self, family: PackageFamily, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages
            .insert(family, packages.into_iter().map(Into::into).collect());
        self
    }

    /// Packages for a family, empty if none configured
    pub fn packages(&self, family: PackageFamily) -> &[String] {
        self.packages.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Where and how often to look for the readiness marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    /// File that appears once host bootstrap is done
    pub sentinel: String,
    /// Sleep between remote checks
    pub poll_interval: Duration,
}

impl Default for Readiness {
    fn default() -> Self {
        Self {
            sentinel: "/ceph-qa-ready".to_string(),
            poll_interval: Duration::from_secs(15),
        }
    }
}

/// One unit of remote work in a host's sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Block until the sentinel file exists
    AwaitReady {
        sentinel: String,
        poll_interval: Duration,
    },
    /// Run a shell command
    Exec { command: String, long_running: bool },
}

impl Step {
    /// Long-running command step
    pub fn long_running(command: impl Into<String>) -> Self {
        Self::Exec {
            command: command.into(),
            long_running: true,
        }
    }

    /// Quick command step
    pub fn quick(command: impl Into<String>) -> Self {
        Self::Exec {
            command: command.into(),
            long_running: false,
        }
    }

    /// Check if this step waits for readiness
    pub fn is_await(&self) -> bool {
        matches!(self, Self::AwaitReady { .. })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitReady {
                sentinel,
                poll_interval,
            } => write!(
                f,
                "wait for {} (every {}s)",
                sentinel,
                poll_interval.as_secs()
            ),
            Self::Exec { command, .. } => write!(f, "{command}"),
        }
    }
}

/// How provisioning ended for one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HostOutcome {
    /// Every step succeeded
    Completed,
    /// A step failed; later steps were not run
    Failed { step: String, error: String },
}

impl HostOutcome {
    /// Check if the host finished without failure
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Result of provisioning one host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostReport {
    pub hostname: String,
    pub family: PackageFamily,
    pub outcome: HostOutcome,
    /// Steps that finished successfully
    pub steps_completed: usize,
    pub elapsed_ms: u64,
}

impl HostReport {
    /// Check if the host finished without failure
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Aggregate result of a provisioning run, hosts in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub hosts: Vec<HostReport>,
}

impl RunReport {
    /// Total number of hosts processed
    pub fn total(&self) -> usize {
        self.hosts.len()
    }

    /// Number of hosts that completed
    pub fn succeeded(&self) -> usize {
        self.hosts.iter().filter(|h| h.is_success()).count()
    }

    /// Number of hosts that failed
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Reports of failed hosts
    pub fn failures(&self) -> impl Iterator<Item = &HostReport> {
        self.hosts.iter().filter(|h| !h.is_success())
    }

    /// Check if every host completed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Process status for this run: 0 when every host completed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(hostname: &str, outcome: HostOutcome) -> HostReport {
        HostReport {
            hostname: hostname.to_string(),
            family: PackageFamily::Deb,
            outcome,
            steps_completed: 0,
            elapsed_ms: 0,
        }
    }

    #[test]
    fn test_family_names() {
        assert_eq!(PackageFamily::Rpm.to_string(), "rpm");
    }

    #[test]
    fn test_default_catalog() {
        let catalog = PackageCatalog::default();
        assert_eq!(
            catalog.packages(PackageFamily::Deb),
            ["wget", "git", "python-virtualenv"]
        );
        assert_eq!(
            catalog.packages(PackageFamily::Rpm),
            ["wget", "git", "redhat-lsb", "python-virtualenv"]
        );
        assert!(PackageCatalog::new().packages(PackageFamily::Deb).is_empty());
    }

    #[test]
    fn test_catalog_override_keeps_order() {
        let catalog =
            PackageCatalog::default().with_packages(PackageFamily::Deb, ["vim", "curl", "git"]);
        assert_eq!(catalog.packages(PackageFamily::Deb), ["vim", "curl", "git"]);
    }

    #[test]
    fn test_step_display() {
        let step = Step::AwaitReady {
            sentinel: "/ceph-qa-ready".into(),
            poll_interval: Duration::from_secs(15),
        };
        assert_eq!(step.to_string(), "wait for /ceph-qa-ready (every 15s)");
        assert!(step.is_await());
        assert_eq!(Step::quick("sudo yum clean metadata").to_string(), "sudo yum clean metadata");
    }

    #[test]
    fn test_run_report_exit_code() {
        let mut run = RunReport {
            started_at: Utc::now(),
            elapsed_ms: 0,
            hosts: vec![report("h1", HostOutcome::Completed)],
        };
        assert_eq!(run.exit_code(), 0);

        run.hosts.push(report(
            "h2",
            HostOutcome::Failed {
                step: "sudo yum install -y wget".into(),
                error: "exit 1".into(),
            },
        ));
        assert_eq!(run.failed(), 1);
        assert_eq!(run.succeeded(), 1);
        assert_eq!(run.exit_code(), 1);
        assert_eq!(run.failures().next().unwrap().hostname, "h2");
    }

    #[test]
    fn test_empty_run_is_success() {
        let run = RunReport {
            started_at: Utc::now(),
            elapsed_ms: 0,
            hosts: Vec::new(),
        };
        assert!(run.is_success());
        assert_eq!(run.exit_code(), 0);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(report("h1", HostOutcome::Completed)).unwrap();
        assert_eq!(json["outcome"]["status"], "completed");
        assert_eq!(json["family"], "deb");
    }
}
