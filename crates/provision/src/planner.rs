//! Command planning - turns a package family into its remote step sequence

use crate::types::{PackageCatalog, PackageFamily, Readiness, Step};
use remotekit::shell_quote;

/// Build the full step sequence for a host of the given family.
///
/// Every plan starts with the readiness wait. Debian hosts then run a single
/// `apt-get install`. RPM hosts run the same `yum install` twice followed by
/// a metadata clean.
pub fn plan(catalog: &PackageCatalog, readiness: &Readiness, family: PackageFamily) -> Vec<Step> {
    let mut steps = vec![Step::AwaitReady {
        sentinel: readiness.sentinel.clone(),
        poll_interval: readiness.poll_interval,
    }];

    let packages = catalog
        .packages(family)
        .iter()
        .map(String::as_str)
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ");

    match family {
        PackageFamily::Deb => {
            steps.push(Step::long_running(format!(
                "sudo apt-get install -y {packages}"
            )));
        }
        PackageFamily::Rpm => {
            let install = format!("sudo yum install -y {packages}");
            // The install runs twice on purpose
            steps.push(Step::long_running(install.clone()));
            steps.push(Step::long_running(install));
            steps.push(Step::quick("sudo yum clean metadata"));
        }
    }

    steps
}
