//! # Declarative
//!
//! A framework for declarative resource management.
//!
//! This crate provides the core abstractions for declaring desired state,
//! detecting current state, and converging systems to match the desired state.
//!
//! ## Core Concepts
//!
//! - **Resource**: Something that is present or absent and can be converged
//! - **ResourceState**: The current or desired state of a resource
//! - **ExecutionPlan**: The ordered resources of one pass
//! - **Executor**: Applies resources sequentially, one at a time
//!
//! ## Callback Traits
//!
//! - [`ProgressCallback`]: Receives progress updates
//! - [`ConfirmCallback`]: Handles user confirmations
//!
//! This allows the crate to be used without hard dependencies on
//! specific UI frameworks.

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{
    ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback,
};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs};
pub use executor::{execute, execute_simple};
pub use planner::ExecutionPlan;
pub use resource::{BoxedResource, Resource};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary, ResourceState};
