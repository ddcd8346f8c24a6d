//! Host descriptors handed to the provisioner

use crate::types::PackageFamily;
use remotekit::Remote;
use std::fmt;

/// One remote machine to provision.
///
/// Owns the host's execution capability; only the task provisioning this
/// host ever touches it.
pub struct Host {
    hostname: String,
    family: PackageFamily,
    remote: Box<dyn Remote>,
}

impl Host {
    /// Create a host descriptor
    pub fn new(
        hostname: impl Into<String>,
        family: PackageFamily,
        remote: impl Remote + 'static,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            family,
            remote: Box::new(remote),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn family(&self) -> PackageFamily {
        self.family
    }

    /// Remote execution capability for this host
    pub fn remote(&self) -> &dyn Remote {
        self.remote.as_ref()
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("hostname", &self.hostname)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}
