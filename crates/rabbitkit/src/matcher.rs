//! Resource matcher: binds desired queues to discovered ones.
//!
//! Matching is exact string equality on the `name@vhost` identifier, so the
//! broker is queried once per pass rather than once per desired queue.

use crate::error::Result;
use crate::identity::{QueueId, SEPARATOR};
use crate::types::{DesiredQueue, Existence, PropertyDrift, QueueRecord};
use std::collections::HashMap;

/// Discovered broker state for one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<QueueRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<QueueRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[QueueRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index records by identifier.
    pub fn index(&self) -> HashMap<String, &QueueRecord> {
        self.records.iter().map(|r| (r.identifier(), r)).collect()
    }

    /// Find the record with exactly this identifier.
    pub fn find(&self, identifier: &str) -> Option<&QueueRecord> {
        self.records.iter().find(|r| r.identifier() == identifier)
    }
}

/// A desired queue together with what the broker reported for it.
#[derive(Debug, Clone)]
pub struct QueueBinding {
    pub desired: DesiredQueue,
    pub id: QueueId,
    pub observed: Option<QueueRecord>,
    /// Observed existence; only the transition engine changes it
    pub existence: Existence,
}

impl QueueBinding {
    /// Bind a desired queue to its match, if any.
    pub fn new(desired: DesiredQueue, id: QueueId, observed: Option<QueueRecord>) -> Self {
        let existence = observed
            .as_ref()
            .map_or(Existence::Absent, |r| r.existence);
        Self {
            desired,
            id,
            observed,
            existence,
        }
    }

    pub fn identifier(&self) -> String {
        self.id.identifier()
    }

    /// Whether observed existence already matches the desired one.
    pub fn is_converged(&self) -> bool {
        self.existence == self.desired.ensure.existence()
    }

    /// Property drift of a present queue; empty when absent.
    pub fn drift(&self) -> Vec<PropertyDrift> {
        match &self.observed {
            Some(record) if self.existence == Existence::Present => record.drift(&self.desired),
            _ => Vec::new(),
        }
    }
}

/// Bind every desired queue against the snapshot.
///
/// A full identifier is first matched verbatim, so a discovered queue whose
/// name contains `@` binds to its own identifier. Bare names and vhost
/// overrides match on the resolved identity. A desired identifier that
/// cannot be resolved is an error; unmatched queues are bound as absent.
pub fn bind(
    snapshot: &Snapshot,
    desired: Vec<DesiredQueue>,
    default_vhost: &str,
) -> Result<Vec<QueueBinding>> {
    let index = snapshot.index();

    desired
        .into_iter()
        .map(|queue| {
            let verbatim = match queue.vhost {
                None if queue.name.contains(SEPARATOR) => index.get(queue.name.as_str()),
                _ => None,
            };
            if let Some(record) = verbatim {
                let observed = (*record).clone();
                return Ok(QueueBinding::new(queue, observed.id(), Some(observed)));
            }

            let id = QueueId::parse(&queue.name, queue.vhost.as_deref(), default_vhost)?;
            let observed = index.get(&id.identifier()).map(|r| (*r).clone());
            Ok(QueueBinding::new(queue, id, observed))
        })
        .collect()
}
