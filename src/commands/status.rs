//! `burrow status` - every declared queue against the broker.

use anyhow::Result;
use colored::Colorize;
use declarative::ResourceState;

use super::prepare;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, target: Option<&str>) -> Result<()> {
    let plan = prepare(ctx, target)?;

    if plan.is_empty() {
        ui::info("No queues declared");
        return Ok(());
    }

    ui::header("Queues");
    let mut pending = 0;
    let mut drifted = 0;

    for resource in &plan.resources {
        let current = resource.current_state()?;
        let desired = resource.desired_state();
        let notes = resource.notes();

        let glyph = if current != desired {
            pending += 1;
            "●".yellow()
        } else if !notes.is_empty() {
            drifted += 1;
            "◐".yellow()
        } else {
            "✓".green()
        };

        println!(
            "{glyph} {}  {}",
            resource.id().bold(),
            state_label(current, desired)
        );
        if ctx.verbose > 0 {
            ui::dim(&resource.description());
        }
        for note in notes {
            ui::dim(&format!("drift {note}"));
        }
    }

    println!();
    if pending == 0 && drifted == 0 {
        ui::success("All queues match the manifest");
    } else {
        if pending > 0 {
            ui::warn(&format!("{pending} queue(s) need apply"));
        }
        if drifted > 0 {
            ui::warn(&format!(
                "{drifted} queue(s) differ in properties; recreate them to change those"
            ));
        }
    }
    Ok(())
}

fn state_label(current: ResourceState, desired: ResourceState) -> String {
    if current == desired {
        current.to_string()
    } else {
        format!("{current} (want {desired})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_label() {
        assert_eq!(
            state_label(ResourceState::Present, ResourceState::Present),
            "present"
        );
        assert_eq!(
            state_label(ResourceState::Absent, ResourceState::Present),
            "absent (want present)"
        );
    }
}
