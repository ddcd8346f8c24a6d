//! Progress bar over hosts, fed by the provisioner's callbacks.

use indicatif::{ProgressBar, ProgressStyle};
use provision::{HostReport, ProgressCallback, Step};

/// Progress bar that advances once per finished host
pub struct HostProgress {
    bar: ProgressBar,
}

impl HostProgress {
    /// Visible bar over `hosts` hosts, or a hidden one
    pub fn new(hosts: usize, hidden: bool) -> Self {
        if hidden {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(hosts as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} {prefix} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        bar.set_prefix("Provisioning");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressCallback for HostProgress {
    fn on_host_start(&self, hostname: &str) {
        self.bar.set_message(format!("{hostname}: starting"));
    }

    fn on_step(&self, hostname: &str, index: usize, total: usize, step: &Step) {
        let action = if step.is_await() {
            "waiting for readiness"
        } else {
            "installing"
        };
        self.bar
            .set_message(format!("{hostname}: {action} ({index}/{total})"));
    }

    fn on_host_complete(&self, report: &HostReport) {
        let mark = if report.is_success() { "✓" } else { "✗" };
        self.bar.set_message(format!("{} {}", report.hostname, mark));
        self.bar.inc(1);
    }
}
