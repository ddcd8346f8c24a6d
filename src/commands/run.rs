use anyhow::{Context as AnyhowContext, Result};
use chrono::Local;
use colored::Colorize;
use provision::{Host, HostOutcome, RunReport};
use remotekit::Session;
use std::process::ExitCode;

use crate::Context;
use crate::cli::RunArgs;
use crate::commands::plan;
use crate::inventory::Inventory;
use crate::paths;
use crate::progress::HostProgress;
use crate::ui;

pub fn run(ctx: &Context, args: &RunArgs) -> Result<ExitCode> {
    let path = paths::inventory_path(args.inventory.inventory.as_deref())?;
    let inventory = Inventory::load(&path)?;
    let provisioner = inventory.provisioner().with_jobs(args.jobs);
    let chatty = !ctx.quiet && !args.json;

    if chatty {
        ui::header("Provisioning Test Nodes");
        ui::kv("Inventory", &path.display().to_string());
        ui::kv("Hosts", &inventory.hosts.len().to_string());
        ui::kv(
            "Parallel jobs",
            &args
                .jobs
                .map_or_else(|| "all".to_string(), |j| j.to_string()),
        );
        ui::kv("Sentinel", &inventory.readiness.sentinel);
    }

    if args.dry_run {
        ui::warn("Dry run - no hosts will be contacted");
        plan::print_plan(&inventory, &provisioner);
        return Ok(ExitCode::SUCCESS);
    }

    let hosts = connect(&inventory)?;

    // Log lines at -v and above would tear through the bar
    let progress = HostProgress::new(hosts.len(), !chatty || ctx.verbose > 0);
    let report = provisioner.run_with_progress(&hosts, &progress)?;
    progress.finish();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else if !ctx.quiet {
        print_summary(&report);
    }

    Ok(ExitCode::from(u8::try_from(report.exit_code()).unwrap_or(1)))
}

/// Open one SSH session per inventory host
fn connect(inventory: &Inventory) -> Result<Vec<Host>> {
    let retry = inventory.retry_config();
    inventory
        .hosts
        .iter()
        .map(|entry| {
            let session = Session::ssh(&entry.hostname, inventory.target_for(entry))
                .with_context(|| format!("Cannot open session for {}", entry.hostname))?
                .with_retry(retry.clone());
            Ok(Host::new(&entry.hostname, entry.family, session))
        })
        .collect()
}

fn print_summary(report: &RunReport) {
    println!();
    if report.total() == 0 {
        ui::info("No hosts in inventory");
        return;
    }

    for host in &report.hosts {
        let elapsed = ui::format_duration_ms(host.elapsed_ms);
        match &host.outcome {
            HostOutcome::Completed => println!(
                "  {} {} {}",
                "✓".green(),
                host.hostname,
                format!("({}, {} steps, {})", host.family, host.steps_completed, elapsed).dimmed()
            ),
            HostOutcome::Failed { step, error } => {
                println!(
                    "  {} {} {}",
                    "✗".red(),
                    host.hostname,
                    format!("({}, {})", host.family, elapsed).dimmed()
                );
                ui::dim(&format!("step: {step}"));
                ui::dim(&format!("error: {error}"));
            }
        }
    }

    println!();
    let started = report.started_at.with_timezone(&Local);
    ui::kv("Started", &started.format("%Y-%m-%d %H:%M:%S").to_string());
    let total_time = ui::format_duration_ms(report.elapsed_ms);
    if report.is_success() {
        ui::success(&format!(
            "Provisioned {} host(s) in {}",
            report.succeeded(),
            total_time
        ));
    } else {
        ui::error(&format!(
            "{} of {} host(s) failed ({})",
            report.failed(),
            report.total(),
            total_time
        ));
    }
}
