//! Resource trait for declarative state management
//!
//! A Resource is something that is either present or absent, and can be
//! changed to reach a desired state. State is read from a snapshot taken
//! before the pass; `apply` is the only place that may change it.

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Core trait for declarative resources
///
/// # Example
///
/// ```ignore
/// use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
///
/// #[derive(Debug)]
/// struct Marker {
///     path: String,
///     exists: bool,
/// }
///
/// impl Resource for Marker {
///     fn id(&self) -> String {
///         self.path.clone()
///     }
///
///     fn description(&self) -> String {
///         format!("Marker file at {}", self.path)
///     }
///
///     fn resource_type(&self) -> &'static str {
///         "marker"
///     }
///
///     fn current_state(&self) -> Result<ResourceState> {
///         Ok(if self.exists { ResourceState::Present } else { ResourceState::Absent })
///     }
///
///     fn desired_state(&self) -> ResourceState {
///         ResourceState::Present
///     }
///
///     fn apply(&mut self, ctx: &ApplyContext) -> Result<ApplyResult> {
///         if ctx.dry_run {
///             return Ok(ApplyResult::Skipped { reason: "Dry run".into() });
///         }
///         std::fs::write(&self.path, "")?;
///         self.exists = true;
///         Ok(ApplyResult::Created)
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Unique identifier for this resource
    ///
    /// Stable across passes, e.g. `orders@/prod` for a queue.
    fn id(&self) -> String;

    /// Human-readable description of what this resource does
    fn description(&self) -> String;

    /// Resource type category, used for grouping and filtering
    fn resource_type(&self) -> &'static str;

    /// Current state of this resource
    fn current_state(&self) -> Result<ResourceState>;

    /// Desired state for this resource
    fn desired_state(&self) -> ResourceState;

    /// Differences that exist but are not converged by `apply`
    fn notes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Check if the resource needs changes to reach desired state
    fn needs_apply(&self) -> Result<bool> {
        Ok(self.current_state()? != self.desired_state())
    }

    /// Apply changes to reach the desired state
    ///
    /// This method should:
    /// 1. Check if already in desired state (return NoChange)
    /// 2. Respect ctx.dry_run (return Skipped if true)
    /// 3. Make the necessary changes
    /// 4. Update its own current state only after success
    fn apply(&mut self, ctx: &ApplyContext) -> Result<ApplyResult>;
}

/// A boxed resource for type-erased storage
pub type BoxedResource = Box<dyn Resource>;
