//! `burrow apply` - one reconciliation pass.

use anyhow::{Context as _, Result, bail};
use colored::Colorize;
use declarative::{
    ApplyResult, AutoConfirm, ConfirmCallback, ExecuteOptions, ExecuteSummary, ProgressCallback,
    execute,
};
use std::io::IsTerminal;

use super::prepare;
use crate::Context;
use crate::ui;

/// Prints each transition as it completes.
struct UiProgress {
    quiet: bool,
}

impl ProgressCallback for UiProgress {
    fn on_batch_start(&mut self, count: usize) {
        if !self.quiet {
            ui::header(&format!("Applying {count} change(s)"));
        }
    }

    fn on_resource_start(&mut self, id: &str, description: &str) {
        log::debug!("applying {id}: {description}");
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        match result {
            ApplyResult::Created => println!("  {} {id}", "+".green()),
            ApplyResult::Removed => println!("  {} {id}", "-".red()),
            ApplyResult::Failed { error } => ui::error(&format!("{id}: {error}")),
            ApplyResult::NoChange | ApplyResult::Skipped { .. } => {}
        }
    }

    fn on_batch_complete(&mut self) {}
}

/// Asks on the terminal; refuses when there is no terminal to ask on.
struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if !std::io::stdin().is_terminal() {
            bail!("Refusing to apply without a terminal; pass --yes to confirm");
        }
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .context("Failed to read confirmation")
    }
}

pub fn run(ctx: &Context, target: Option<&str>, dry_run: bool, yes: bool) -> Result<()> {
    let mut plan = prepare(ctx, target)?;
    let opts = ExecuteOptions { dry_run };
    let mut progress = UiProgress { quiet: ctx.quiet };

    let summary = if yes {
        execute(&mut plan, &opts, &mut progress, &mut AutoConfirm)?
    } else {
        execute(&mut plan, &opts, &mut progress, &mut PromptConfirm)?
    };

    report(&summary, dry_run);

    if !summary.is_success() {
        bail!("{} queue(s) failed to converge", summary.failed);
    }
    Ok(())
}

fn report(summary: &ExecuteSummary, dry_run: bool) {
    println!();
    if summary.total_changes() == 0 && summary.skipped == 0 && summary.failed == 0 {
        ui::success("Nothing to do");
    } else if dry_run {
        ui::info(&format!("Dry run: {} change(s) pending", summary.skipped));
    } else {
        ui::info(&format!(
            "{} created, {} deleted, {} unchanged, {} skipped, {} failed",
            summary.created, summary.removed, summary.no_change, summary.skipped, summary.failed
        ));
    }
}
