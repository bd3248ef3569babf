use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "burrow")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Converge RabbitMQ queues to a declared manifest", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Queue manifest (TOML or JSON)
    #[arg(short, long, global = true, env = "BURROW_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List queues currently on the broker
    List(ListArgs),

    /// Show every declared queue against the broker
    Status(TargetArgs),

    /// Preview the transitions apply would make
    Diff(TargetArgs),

    /// Create and delete queues to match the manifest
    Apply(ApplyArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// Only list queues in this vhost
    #[arg(long)]
    pub vhost: Option<String>,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Restrict to queues whose id contains this (e.g. "orders" or "queue:@/prod")
    pub target: Option<String>,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// Restrict to queues whose id contains this
    pub target: Option<String>,

    /// Show what would change without running any admin command
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::parse_from(["burrow", "-vv", "apply", "orders", "--dry-run"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.target.as_deref(), Some("orders"));
                assert!(args.dry_run);
                assert!(!args.yes);
            }
            _ => panic!("expected apply"),
        }
    }
}
