//! Execution engine - applies resources one at a time

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::compute_diffs;
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;

/// Execute a plan with the given options and callbacks
///
/// Resources are applied sequentially in plan order. A resource whose
/// apply fails is recorded as `Failed` and the pass moves on; the caller
/// decides what a non-zero `failed` count means.
pub fn execute<P, C>(
    plan: &mut ExecutionPlan,
    opts: &ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let diffs = compute_diffs(&plan.resources)?;
    let unchanged = plan.resources.len() - diffs.len();

    if diffs.is_empty() {
        return Ok(ExecuteSummary {
            no_change: unchanged,
            ..Default::default()
        });
    }

    if opts.dry_run {
        return Ok(ExecuteSummary {
            skipped: diffs.len(),
            no_change: unchanged,
            ..Default::default()
        });
    }

    if !confirm.confirm(&format!("Apply {} change(s)?", diffs.len()))? {
        return Ok(ExecuteSummary {
            skipped: diffs.len(),
            no_change: unchanged,
            ..Default::default()
        });
    }

    let ctx = ApplyContext::new(false);
    let mut summary = ExecuteSummary::default();

    progress.on_batch_start(diffs.len());
    for resource in &mut plan.resources {
        if !resource.needs_apply()? {
            summary.add_result(&ApplyResult::NoChange);
            continue;
        }

        let id = resource.id();
        progress.on_resource_start(&id, &resource.description());
        let result = apply_resource(resource.as_mut(), &ctx);
        progress.on_resource_complete(&id, &result);
        summary.add_result(&result);
    }
    progress.on_batch_complete();

    Ok(summary)
}

/// Apply a single resource
fn apply_resource(resource: &mut dyn Resource, ctx: &ApplyContext) -> ApplyResult {
    match resource.apply(ctx) {
        Ok(result) => result,
        Err(e) => ApplyResult::Failed {
            error: format!("{e:#}"),
        },
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple(plan: &mut ExecutionPlan, opts: &ExecuteOptions) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, opts, &mut NoProgress, &mut AutoConfirm)
}
