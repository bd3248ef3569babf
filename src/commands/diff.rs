//! `burrow diff` - preview what apply would change.

use anyhow::Result;
use colored::Colorize;
use declarative::{DiffSummary, ResourceDiff, compute_diffs};

use super::prepare;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let plan = prepare(ctx, target)?;
    let diffs = compute_diffs(&plan.resources)?;
    let summary = DiffSummary::from_diffs(&diffs);

    if !summary.has_changes() {
        ui::success("No changes needed");
        return Ok(());
    }

    for diff in &diffs {
        println!("{}", format_diff(diff));
        for note in visible_notes(diff) {
            ui::dim(note);
        }
    }

    println!();
    ui::info(&format!(
        "{} to create, {} to delete",
        summary.additions, summary.removals
    ));
    Ok(())
}

/// Drift notes are noise on a queue that is about to be deleted.
fn visible_notes(diff: &ResourceDiff) -> &[String] {
    if diff.is_removal() {
        &[]
    } else {
        diff.notes.as_slice()
    }
}

fn format_diff(diff: &ResourceDiff) -> String {
    if diff.is_addition() {
        format!("{} {}", "+".green(), diff.description)
    } else {
        format!("{} {}", "-".red(), diff.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::ResourceState;

    #[test]
    fn test_format_diff() {
        colored::control::set_override(false);
        let diff = ResourceDiff {
            resource_id: "orders@/prod".into(),
            resource_type: "queue".into(),
            description: "Queue orders in vhost /prod".into(),
            current: ResourceState::Present,
            desired: ResourceState::Absent,
            notes: Vec::new(),
        };
        assert_eq!(format_diff(&diff), "- Queue orders in vhost /prod");
    }

    #[test]
    fn test_removal_hides_drift_notes() {
        let mut diff = ResourceDiff {
            resource_id: "orders@/prod".into(),
            resource_type: "queue".into(),
            description: "Queue orders in vhost /prod".into(),
            current: ResourceState::Present,
            desired: ResourceState::Absent,
            notes: vec!["durable: false -> true".into()],
        };
        assert!(visible_notes(&diff).is_empty());

        diff.current = ResourceState::Absent;
        diff.desired = ResourceState::Present;
        assert_eq!(visible_notes(&diff), ["durable: false -> true".to_string()]);
    }
}
