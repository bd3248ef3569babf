//! Diff computation for resources

use crate::resource::{BoxedResource, Resource};
use crate::types::ResourceState;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
    /// Differences `apply` will not fix
    pub notes: Vec<String>,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning None if no changes needed
    pub fn from_resource(resource: &dyn Resource) -> Result<Option<Self>> {
        let current = resource.current_state()?;
        let desired = resource.desired_state();

        if current == desired {
            return Ok(None);
        }

        Ok(Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
            notes: resource.notes(),
        }))
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        self.current.is_absent() && self.desired.is_present()
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        self.current.is_present() && self.desired.is_absent()
    }
}

/// Compute diffs for a list of resources
///
/// Returns only resources that have differences between current and
/// desired state. The first state-detection error aborts the computation.
pub fn compute_diffs(resources: &[BoxedResource]) -> Result<Vec<ResourceDiff>> {
    let mut diffs = Vec::new();
    for resource in resources {
        if let Some(diff) = ResourceDiff::from_resource(resource.as_ref())? {
            diffs.push(diff);
        }
    }
    Ok(diffs)
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to remove
    pub removals: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
