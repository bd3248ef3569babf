//! Transition engine: declares and deletes queues with `rabbitmqadmin`.
//!
//! Each binding is either `absent` or `present`. A transition is issued
//! only when that disagrees with the desired state, and the binding's
//! existence is written only after the command succeeds. A failed command
//! leaves it untouched so the next pass retries the same transition.

use crate::arguments::encode_arguments;
use crate::backend::CommandInvoker;
use crate::error::Result;
use crate::matcher::QueueBinding;
use crate::types::{AdminSettings, Existence, ToolPaths};
use std::fmt;
use std::sync::Arc;

/// Outcome of converging one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `absent -> present`
    Created,
    /// `present -> absent`
    Destroyed,
    /// Already in the desired state
    NoOp,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Created => write!(f, "create"),
            Transition::Destroyed => write!(f, "destroy"),
            Transition::NoOp => write!(f, "no-op"),
        }
    }
}

/// Decide which transition a binding needs, without running anything.
pub fn plan(binding: &QueueBinding) -> Transition {
    match (binding.existence, binding.desired.ensure.existence()) {
        (Existence::Absent, Existence::Present) => Transition::Created,
        (Existence::Present, Existence::Absent) => Transition::Destroyed,
        _ => Transition::NoOp,
    }
}

/// Issues create/destroy commands for bindings.
#[derive(Clone)]
pub struct TransitionEngine {
    invoker: Arc<dyn CommandInvoker>,
    tools: ToolPaths,
    admin: AdminSettings,
}

impl TransitionEngine {
    pub fn new(invoker: Arc<dyn CommandInvoker>, tools: ToolPaths, admin: AdminSettings) -> Self {
        Self {
            invoker,
            tools,
            admin,
        }
    }

    /// Bring a binding to its desired existence.
    pub fn converge(&self, binding: &mut QueueBinding) -> Result<Transition> {
        let transition = plan(binding);
        match transition {
            Transition::Created => {
                self.create(binding)?;
                binding.existence = Existence::Present;
            }
            Transition::Destroyed => {
                self.destroy(binding)?;
                binding.existence = Existence::Absent;
            }
            Transition::NoOp => {}
        }
        Ok(transition)
    }

    /// Declare the queue.
    pub fn create(&self, binding: &QueueBinding) -> Result<()> {
        let desired = &binding.desired;
        let arguments = encode_arguments(&desired.arguments_or_default())?;

        let mut args = self.admin_args("declare", binding);
        args.extend([
            format!("name={}", binding.id.name),
            format!("durable={}", desired.durable),
            format!("auto_delete={}", desired.auto_delete),
            format!("arguments={arguments}"),
        ]);

        log::info!("declaring queue {}", binding.id);
        self.invoker.run(&self.tools.rabbitmqadmin, &args)?;
        Ok(())
    }

    /// Delete the queue.
    pub fn destroy(&self, binding: &QueueBinding) -> Result<()> {
        let mut args = self.admin_args("delete", binding);
        args.push(format!("name={}", binding.id.name));

        log::info!("deleting queue {}", binding.id);
        self.invoker.run(&self.tools.rabbitmqadmin, &args)?;
        Ok(())
    }

    /// `<verb> queue --vhost=.. --user=.. --password=.. -c <config>`
    fn admin_args(&self, verb: &str, binding: &QueueBinding) -> Vec<String> {
        let user = binding.desired.user.as_deref().unwrap_or(&self.admin.user);
        let password = binding
            .desired
            .password
            .as_deref()
            .unwrap_or(&self.admin.password);

        vec![
            verb.to_string(),
            "queue".to_string(),
            format!("--vhost={}", binding.id.vhost),
            format!("--user={user}"),
            format!("--password={password}"),
            "-c".to_string(),
            self.admin.config_file.clone(),
        ]
    }
}

impl fmt::Debug for TransitionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionEngine")
            .field("tools", &self.tools)
            .field("config_file", &self.admin.config_file)
            .finish_non_exhaustive()
    }
}
