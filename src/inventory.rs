use anyhow::{Context, Result, bail};
use provision::{PackageCatalog, PackageFamily, Provisioner, Readiness};
use remotekit::{RetryConfig, SshTarget};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::paths;

// ============================================================================
// Inventory Schema
// ============================================================================

/// Hosts to provision plus the settings shared by all of them
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Inventory {
    /// SSH connection defaults
    #[serde(default)]
    pub ssh: SshSettings,

    /// Readiness marker settings
    #[serde(default)]
    pub readiness: ReadinessSettings,

    /// Package lists per family
    #[serde(default)]
    pub packages: PackageSettings,

    /// Hosts to provision
    #[serde(default)]
    pub hosts: Vec<HostEntry>,
}

impl Inventory {
    /// Load an inventory file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read inventory: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid inventory: {}", path.display()))
    }

    /// Parse and validate inventory TOML
    pub fn parse(content: &str) -> Result<Self> {
        let inventory: Self = toml::from_str(content).context("Invalid TOML format")?;
        inventory.validate()?;
        Ok(inventory)
    }

    /// Validate the inventory
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (index, host) in self.hosts.iter().enumerate() {
            if host.hostname.trim().is_empty() {
                bail!("Host #{} has an empty hostname", index + 1);
            }
            if !seen.insert(host.hostname.as_str()) {
                bail!("Duplicate host '{}'", host.hostname);
            }
        }

        if self.packages.deb.is_empty() {
            bail!("packages.deb must list at least one package");
        }
        if self.packages.rpm.is_empty() {
            bail!("packages.rpm must list at least one package");
        }
        for (section, names) in [("deb", &self.packages.deb), ("rpm", &self.packages.rpm)] {
            if let Some(bad) = names.iter().find(|name| !is_package_name(name)) {
                bail!("packages.{section} has an invalid package name '{bad}'");
            }
        }

        if self.readiness.sentinel.trim().is_empty() {
            bail!("readiness.sentinel must not be empty");
        }
        if self.readiness.poll_interval == 0 {
            bail!("readiness.poll_interval must be at least 1 second");
        }

        Ok(())
    }

    /// Number of hosts of a family
    pub fn count(&self, family: PackageFamily) -> usize {
        self.hosts.iter().filter(|h| h.family == family).count()
    }

    pub fn catalog(&self) -> PackageCatalog {
        PackageCatalog::new()
            .with_packages(PackageFamily::Deb, self.packages.deb.iter().cloned())
            .with_packages(PackageFamily::Rpm, self.packages.rpm.iter().cloned())
    }

    pub fn readiness(&self) -> Readiness {
        Readiness {
            sentinel: self.readiness.sentinel.clone(),
            poll_interval: Duration::from_secs(self.readiness.poll_interval),
        }
    }

    /// Provisioner configured from this inventory
    pub fn provisioner(&self) -> Provisioner {
        Provisioner::new(self.catalog()).with_readiness(self.readiness())
    }

    /// SSH target for a host, applying inventory-wide defaults
    pub fn target_for(&self, host: &HostEntry) -> SshTarget {
        SshTarget {
            address: host.address.clone().unwrap_or_else(|| host.hostname.clone()),
            user: host.user.clone().or_else(|| self.ssh.user.clone()),
            port: host.port.or(self.ssh.port),
            identity_file: self.ssh.identity_file.as_deref().map(paths::expand),
            connect_timeout: self.ssh.connect_timeout,
        }
    }

    /// Retry policy for SSH transport failures
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.ssh.retries.max(1),
            ..RetryConfig::default()
        }
    }
}

/// A single package spec: no whitespace and no leading dash
fn is_package_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with('-') && !name.chars().any(char::is_whitespace)
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SshSettings {
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Private key, `~` and `$VARS` are expanded
    #[serde(default)]
    pub identity_file: Option<String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Attempts per command when the SSH transport fails
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            user: None,
            port: None,
            identity_file: None,
            connect_timeout: default_connect_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessSettings {
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    /// Seconds between remote checks
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_sentinel() -> String {
    Readiness::default().sentinel
}

fn default_poll_interval() -> u64 {
    Readiness::default().poll_interval.as_secs()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PackageSettings {
    #[serde(default = "default_deb_packages")]
    pub deb: Vec<String>,

    #[serde(default = "default_rpm_packages")]
    pub rpm: Vec<String>,
}

impl Default for PackageSettings {
    fn default() -> Self {
        Self {
            deb: default_deb_packages(),
            rpm: default_rpm_packages(),
        }
    }
}

fn default_deb_packages() -> Vec<String> {
    PackageCatalog::default()
        .packages(PackageFamily::Deb)
        .to_vec()
}

fn default_rpm_packages() -> Vec<String> {
    PackageCatalog::default()
        .packages(PackageFamily::Rpm)
        .to_vec()
}

/// One host in the inventory
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HostEntry {
    pub hostname: String,

    /// Package-manager family: "deb" or "rpm"
    pub family: PackageFamily,

    /// Address to connect to, defaults to the hostname
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LAB: &str = r#"
[ssh]
user = "cephuser"
identity_file = "/keys/lab"
retries = 5

[readiness]
sentinel = "/ceph-qa-ready"
poll_interval = 10

[[hosts]]
hostname = "ceph-node1"
family = "deb"
address = "10.0.0.11"

[[hosts]]
hostname = "ceph-node2"
family = "rpm"
user = "root"
port = 2222
"#;

    #[test]
    fn test_parse_full_inventory() {
        let inventory = Inventory::parse(LAB).unwrap();

        assert_eq!(inventory.hosts.len(), 2);
        assert_eq!(inventory.count(PackageFamily::Deb), 1);
        assert_eq!(inventory.count(PackageFamily::Rpm), 1);
        assert_eq!(inventory.readiness().poll_interval, Duration::from_secs(10));
        assert_eq!(inventory.retry_config().max_attempts, 5);
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let inventory = Inventory::parse(
            r#"
[[hosts]]
hostname = "h1"
family = "deb"
"#,
        )
        .unwrap();

        assert_eq!(inventory.readiness(), Readiness::default());
        assert_eq!(inventory.catalog(), PackageCatalog::default());
        assert_eq!(inventory.ssh.connect_timeout, 30);
    }

    #[test]
    fn test_target_for_applies_defaults_and_overrides() {
        let inventory = Inventory::parse(LAB).unwrap();

        let first = inventory.target_for(&inventory.hosts[0]);
        assert_eq!(first.destination(), "cephuser@10.0.0.11");
        assert_eq!(first.port, None);
        assert_eq!(first.identity_file.as_deref(), Some(Path::new("/keys/lab")));

        let second = inventory.target_for(&inventory.hosts[1]);
        assert_eq!(second.destination(), "root@ceph-node2");
        assert_eq!(second.port, Some(2222));
    }

    #[test]
    fn test_package_override() {
        let inventory = Inventory::parse(
            r#"
[packages]
deb = ["wget", "git"]
"#,
        )
        .unwrap();

        let catalog = inventory.catalog();
        assert_eq!(catalog.packages(PackageFamily::Deb), ["wget", "git"]);
        assert_eq!(
            catalog.packages(PackageFamily::Rpm),
            ["wget", "git", "redhat-lsb", "python-virtualenv"]
        );
    }

    #[test]
    fn test_empty_inventory_is_valid() {
        let inventory = Inventory::parse("").unwrap();
        assert!(inventory.hosts.is_empty());
    }

    #[test]
    fn test_rejects_duplicate_hosts() {
        let err = Inventory::parse(
            r#"
[[hosts]]
hostname = "h1"
family = "deb"

[[hosts]]
hostname = "h1"
family = "rpm"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate host 'h1'"));
    }

    #[test]
    fn test_rejects_unknown_family() {
        let result = Inventory::parse(
            r#"
[[hosts]]
hostname = "h1"
family = "apk"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_empty_package_list() {
        let err = Inventory::parse("[packages]\nrpm = []\n").unwrap_err();
        assert!(err.to_string().contains("packages.rpm"));
    }

    #[test]
    fn test_rejects_package_names_that_split_or_look_like_flags() {
        let err = Inventory::parse("[packages]\ndeb = [\"git; reboot\"]\n").unwrap_err();
        assert!(err.to_string().contains("invalid package name 'git; reboot'"));

        let err = Inventory::parse("[packages]\nrpm = [\"--nogpgcheck\"]\n").unwrap_err();
        assert!(err.to_string().contains("packages.rpm"));
    }

    #[test]
    fn test_rejects_zero_poll_interval() {
        let err = Inventory::parse("[readiness]\npoll_interval = 0\n").unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LAB.as_bytes()).unwrap();

        let inventory = Inventory::load(file.path()).unwrap();
        assert_eq!(inventory.hosts[0].hostname, "ceph-node1");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Inventory::load(Path::new("/nonexistent/inventory.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read inventory"));
    }
}
