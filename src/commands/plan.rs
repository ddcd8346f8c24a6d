use anyhow::Result;
use colored::Colorize;
use provision::Provisioner;

use crate::Context;
use crate::cli::InventoryArgs;
use crate::inventory::Inventory;
use crate::paths;
use crate::ui;

pub fn run(_ctx: &Context, args: &InventoryArgs) -> Result<()> {
    let path = paths::inventory_path(args.inventory.as_deref())?;
    let inventory = Inventory::load(&path)?;

    ui::header("Provisioning Plan");
    ui::kv("Inventory", &path.display().to_string());
    print_plan(&inventory, &inventory.provisioner());
    Ok(())
}

/// Print every host's step sequence
pub fn print_plan(inventory: &Inventory, provisioner: &Provisioner) {
    if inventory.hosts.is_empty() {
        println!();
        ui::info("No hosts in inventory");
        return;
    }

    for host in &inventory.hosts {
        let target = inventory.target_for(host);
        ui::section(&format!(
            "{} {}",
            host.hostname,
            format!("({}, {})", host.family, target.destination()).dimmed()
        ));

        let steps = provisioner.plan(host.family);
        for (i, step) in steps.iter().enumerate() {
            ui::step(i + 1, steps.len(), &step.to_string());
        }
    }
}
