use anyhow::Result;
use colored::Colorize;
use provision::PackageFamily;

use crate::Context;
use crate::cli::InventoryArgs;
use crate::inventory::Inventory;
use crate::paths;
use crate::ui;

pub fn run(_ctx: &Context, args: &InventoryArgs) -> Result<()> {
    ui::header("Inventory Check");

    let path = paths::inventory_path(args.inventory.as_deref())?;
    ui::kv("Inventory", &path.display().to_string());

    let inventory = Inventory::load(&path)?;

    ui::kv("Hosts", &inventory.hosts.len().to_string());
    ui::kv("deb hosts", &inventory.count(PackageFamily::Deb).to_string());
    ui::kv("rpm hosts", &inventory.count(PackageFamily::Rpm).to_string());
    ui::kv("Sentinel", &inventory.readiness.sentinel);
    ui::kv(
        "Poll interval",
        &format!("{}s", inventory.readiness.poll_interval),
    );

    if let Some(identity) = &inventory.ssh.identity_file {
        let expanded = paths::expand(identity);
        if !expanded.exists() {
            ui::warn(&format!(
                "Identity file not found: {}",
                expanded.display()
            ));
        }
    }

    println!();
    match remotekit::find_ssh() {
        Ok(ssh) => ui::success(&format!("ssh client: {ssh}")),
        Err(e) => {
            ui::error(&e.to_string());
            println!(
                "      {} {}",
                "Fix:".cyan(),
                e.category().advice()
            );
            anyhow::bail!("Local prerequisites missing");
        }
    }

    if inventory.hosts.is_empty() {
        ui::warn("Inventory is valid but lists no hosts");
    } else {
        ui::success("Inventory is valid");
    }

    Ok(())
}
