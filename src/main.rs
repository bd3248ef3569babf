mod cli;
mod commands;
mod config;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub manifest: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        manifest: cli.manifest,
    };

    match run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::error(&format!("{err:#}"));
            if let Some(hint) = error_hint(&err) {
                ui::dim(&hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::List(args) => commands::list::run(ctx, args.vhost.as_deref()),
        Command::Status(args) => commands::status::run(ctx, args.target.as_deref()),
        Command::Diff(args) => commands::diff::run(ctx, args.target.as_deref()),
        Command::Apply(args) => {
            commands::apply::run(ctx, args.target.as_deref(), args.dry_run, args.yes)
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "burrow", &mut io::stdout());
            Ok(())
        }
    }
}

/// Category and advice for the broker error behind `err`, if there is one.
fn error_hint(err: &anyhow::Error) -> Option<String> {
    let category = err
        .chain()
        .find_map(|e| e.downcast_ref::<rabbitkit::Error>())?
        .category();
    Some(format!("{}: {}", category.description(), category.advice()))
}
