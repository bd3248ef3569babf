//! Execution planner - an ordered list of resources for one pass

use crate::resource::{BoxedResource, Resource};

/// Resources to converge, in declaration order
#[derive(Debug, Default)]
pub struct ExecutionPlan {
    pub resources: Vec<BoxedResource>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the end of the plan
    pub fn add_resource(&mut self, resource: BoxedResource) {
        self.resources.push(resource);
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "name", or "type:name" to also restrict the type.
    /// Names match by substring of the resource id.
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|r| matches_filter(r, resource_type, name))
            }
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Parse a target string like "type:name" into (type, name)
fn parse_target(target: &str) -> (Option<&str>, Option<&str>) {
    match target.split_once(':') {
        Some((rt, "")) => (Some(rt), None),
        Some((rt, name)) => (Some(rt), Some(name)),
        None => (None, Some(target)),
    }
}

/// Check if a resource matches the filter criteria
fn matches_filter(
    resource: &dyn Resource,
    resource_type: Option<&str>,
    name: Option<&str>,
) -> bool {
    if let Some(rt) = resource_type
        && resource.resource_type() != rt
    {
        return false;
    }

    if let Some(n) = name
        && !resource.id().contains(n)
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("orders@/prod"), (None, Some("orders@/prod")));
        assert_eq!(parse_target("queue:orders"), (Some("queue"), Some("orders")));
        assert_eq!(parse_target("queue:"), (Some("queue"), None));
    }
}
