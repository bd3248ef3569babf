//! Queues as declarative resources.

use anyhow::{Context, Result};
use declarative::{ApplyContext, ApplyResult, ExecutionPlan, Resource, ResourceState};
use rabbitkit::{Existence, QueueBinding, Transition, TransitionEngine};

fn state_of(existence: Existence) -> ResourceState {
    match existence {
        Existence::Present => ResourceState::Present,
        Existence::Absent => ResourceState::Absent,
    }
}

/// A declared queue bound to what discovery found for it.
#[derive(Debug)]
pub struct QueueResource {
    binding: QueueBinding,
    engine: TransitionEngine,
}

impl QueueResource {
    pub fn new(binding: QueueBinding, engine: TransitionEngine) -> Self {
        Self { binding, engine }
    }
}

impl Resource for QueueResource {
    fn id(&self) -> String {
        self.binding.identifier()
    }

    fn description(&self) -> String {
        let desired = &self.binding.desired;
        let mut flags = Vec::new();
        if desired.durable {
            flags.push("durable");
        }
        if desired.auto_delete {
            flags.push("auto-delete");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        format!(
            "Queue {} in vhost {}{flags}",
            self.binding.id.name, self.binding.id.vhost
        )
    }

    fn resource_type(&self) -> &'static str {
        "queue"
    }

    fn current_state(&self) -> Result<ResourceState> {
        Ok(state_of(self.binding.existence))
    }

    fn desired_state(&self) -> ResourceState {
        state_of(self.binding.desired.ensure.existence())
    }

    fn notes(&self) -> Vec<String> {
        self.binding
            .drift()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn apply(&mut self, ctx: &ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".into(),
            });
        }

        let id = self.id();
        let transition = self
            .engine
            .converge(&mut self.binding)
            .with_context(|| format!("Failed to converge queue {id}"))?;

        Ok(match transition {
            Transition::Created => ApplyResult::Created,
            Transition::Destroyed => ApplyResult::Removed,
            Transition::NoOp => ApplyResult::NoChange,
        })
    }
}

/// Build a plan from bound queues, in manifest order.
pub fn build_plan(bindings: Vec<QueueBinding>, engine: &TransitionEngine) -> ExecutionPlan {
    let mut plan = ExecutionPlan::new();
    for binding in bindings {
        plan.add_resource(Box::new(QueueResource::new(binding, engine.clone())));
    }
    plan
}
