use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nodeprep")]
#[command(version)]
#[command(about = "Wait for test nodes to finish bootstrapping, then install their prerequisites", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Provision every host in the inventory in parallel
    Run(RunArgs),

    /// Show the remote steps each host would run
    Plan(InventoryArgs),

    /// Validate the inventory and local prerequisites
    Check(InventoryArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct InventoryArgs {
    /// Inventory file (defaults to <config dir>/inventory.toml)
    #[arg(short, long, env = "NODEPREP_INVENTORY")]
    pub inventory: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub inventory: InventoryArgs,

    /// Maximum hosts provisioned at once (default: all)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Print the plan without connecting to any host
    #[arg(short, long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long, conflicts_with = "dry_run")]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["nodeprep", "-vv", "run", "-i", "lab.toml", "-j", "4", "--json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.inventory.inventory, Some(PathBuf::from("lab.toml")));
                assert_eq!(args.jobs, Some(4));
                assert!(args.json);
                assert!(!args.dry_run);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_dry_run_rejects_json() {
        let err = Cli::try_parse_from(["nodeprep", "run", "--dry-run", "--json"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
