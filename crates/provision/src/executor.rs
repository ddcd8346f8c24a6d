//! Execution engine - provisions hosts with a fan-out/join worker pool

use crate::context::{NoProgress, ProgressCallback};
use crate::error::{Result, StepFailure};
use crate::host::Host;
use crate::planner;
use crate::types::{HostOutcome, HostReport, PackageCatalog, PackageFamily, Readiness, RunReport, Step};
use chrono::Utc;
use remotekit::ExecOptions;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Waits for each host's readiness marker, then installs its package set.
#[derive(Debug, Clone, Default)]
pub struct Provisioner {
    catalog: PackageCatalog,
    readiness: Readiness,
    jobs: Option<usize>,
}

impl Provisioner {
    /// Create a provisioner with the given package catalog
    pub fn new(catalog: PackageCatalog) -> Self {
        Self {
            catalog,
            readiness: Readiness::default(),
            jobs: None,
        }
    }

    /// Override the readiness sentinel and poll interval
    pub fn with_readiness(mut self, readiness: Readiness) -> Self {
        self.readiness = readiness;
        self
    }

    /// Cap the number of concurrent workers. `None` runs one worker per host.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Step sequence a host of `family` will run
    pub fn plan(&self, family: PackageFamily) -> Vec<Step> {
        planner::plan(&self.catalog, &self.readiness, family)
    }

    /// Provision every host concurrently and wait for all of them
    pub fn run(&self, hosts: &[Host]) -> Result<RunReport> {
        self.run_with_progress(hosts, &NoProgress)
    }

    /// Provision every host concurrently, reporting progress
    ///
    /// Failures are isolated per host: a failing host never stops its
    /// siblings, and the returned report carries one entry per input host in
    /// input order.
    pub fn run_with_progress<P: ProgressCallback>(
        &self,
        hosts: &[Host],
        progress: &P,
    ) -> Result<RunReport> {
        let started_at = Utc::now();
        let clock = Instant::now();

        if hosts.is_empty() {
            return Ok(RunReport {
                started_at,
                elapsed_ms: 0,
                hosts: Vec::new(),
            });
        }

        let workers = self.jobs.unwrap_or(hosts.len()).clamp(1, hosts.len());
        log::info!(
            "Provisioning {} host(s) with {} worker(s)",
            hosts.len(),
            workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("provision-{i}"))
            .build()?;

        let results: Mutex<Vec<(usize, HostReport)>> = Mutex::new(Vec::with_capacity(hosts.len()));

        pool.scope(|scope| {
            for (index, host) in hosts.iter().enumerate() {
                let results = &results;
                scope.spawn(move |_| {
                    let report = self.provision_host(host, progress);
                    results
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push((index, report));
                });
            }
        });

        let mut results = results.into_inner().unwrap_or_else(PoisonError::into_inner);
        results.sort_by_key(|(index, _)| *index);

        Ok(RunReport {
            started_at,
            elapsed_ms: elapsed_ms(clock),
            hosts: results.into_iter().map(|(_, report)| report).collect(),
        })
    }

    /// Run the wait-then-install protocol against one host.
    ///
    /// Returns the number of steps executed. The first failing step stops
    /// the sequence.
    pub fn install_prereq(&self, host: &Host) -> std::result::Result<usize, StepFailure> {
        self.install_prereq_with(host, &NoProgress)
    }

    fn install_prereq_with<P: ProgressCallback>(
        &self,
        host: &Host,
        progress: &P,
    ) -> std::result::Result<usize, StepFailure> {
        let steps = self.plan(host.family());
        let total = steps.len();

        for (completed, step) in steps.into_iter().enumerate() {
            progress.on_step(host.hostname(), completed + 1, total, &step);
            if let Err(source) = run_step(host, &step) {
                return Err(StepFailure {
                    step,
                    completed,
                    source,
                });
            }
        }

        Ok(total)
    }

    /// Provision one host and turn the outcome into a report.
    ///
    /// A panic inside the task is recorded as that host's failure.
    fn provision_host<P: ProgressCallback>(&self, host: &Host, progress: &P) -> HostReport {
        progress.on_host_start(host.hostname());
        let clock = Instant::now();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.install_prereq_with(host, progress)
        }));

        let (outcome, steps_completed) = match result {
            Ok(Ok(steps)) => {
                log::info!("Provisioned {} ({} steps)", host.hostname(), steps);
                (HostOutcome::Completed, steps)
            }
            Ok(Err(failure)) => {
                log::warn!("Provisioning {} failed: {}", host.hostname(), failure);
                (
                    HostOutcome::Failed {
                        step: failure.step.to_string(),
                        error: failure.source.to_string(),
                    },
                    failure.completed,
                )
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Provisioning task for {} panicked: {}", host.hostname(), message);
                (
                    HostOutcome::Failed {
                        step: "task".to_string(),
                        error: format!("panicked: {message}"),
                    },
                    0,
                )
            }
        };

        let report = HostReport {
            hostname: host.hostname().to_string(),
            family: host.family(),
            outcome,
            steps_completed,
            elapsed_ms: elapsed_ms(clock),
        };
        progress.on_host_complete(&report);
        report
    }
}

/// Execute a single step on the host's remote
fn run_step(host: &Host, step: &Step) -> remotekit::Result<()> {
    match step {
        Step::AwaitReady {
            sentinel,
            poll_interval,
        } => {
            log::info!("Waiting for readiness on {}", host.hostname());
            host.remote().await_ready(sentinel, *poll_interval)?;
            log::info!("Readiness confirmed on {}", host.hostname());
            Ok(())
        }
        Step::Exec {
            command,
            long_running,
        } => {
            log::debug!("[{}] {}", host.hostname(), command);
            let opts = if *long_running {
                ExecOptions::long_running()
            } else {
                ExecOptions::quick()
            };
            let output = host.remote().exec(command, &opts)?;
            if !output.success() {
                log::warn!(
                    "[{}] `{}` exited with {:?}",
                    host.hostname(),
                    command,
                    output.code
                );
            }
            Ok(())
        }
    }
}

fn elapsed_ms(clock: Instant) -> u64 {
    u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
