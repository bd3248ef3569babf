//! Inventory reader: vhosts and queues as reported by `rabbitmqctl`.
//!
//! Discovery runs `list_vhosts` once and `list_queues` once per vhost.
//! Nothing is cached between passes.

use crate::arguments::{Arguments, decode_arguments};
use crate::backend::CommandInvoker;
use crate::error::{Error, Result};
use crate::matcher::Snapshot;
use crate::types::{DecodePolicy, Existence, QueueRecord, ToolPaths};

/// Name prefix of the broker's internal federation queues.
pub const FEDERATION_PREFIX: &str = "federation:";

/// Columns requested from `list_queues`, in listing order.
const QUEUE_COLUMNS: [&str; 4] = ["name", "durable", "auto_delete", "arguments"];

/// Reads broker state through the control tool.
pub struct Inventory<'a> {
    invoker: &'a dyn CommandInvoker,
    tools: &'a ToolPaths,
    policy: DecodePolicy,
}

impl<'a> Inventory<'a> {
    pub fn new(
        invoker: &'a dyn CommandInvoker,
        tools: &'a ToolPaths,
        policy: DecodePolicy,
    ) -> Self {
        Self {
            invoker,
            tools,
            policy,
        }
    }

    /// Enumerate virtual hosts.
    pub fn list_virtual_hosts(&self) -> Result<Vec<String>> {
        let output = self.invoker.run(
            &self.tools.rabbitmqctl,
            &["list_vhosts".to_string(), "-q".to_string()],
        )?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Enumerate the queues of one virtual host.
    pub fn list_queues(&self, vhost: &str) -> Result<Vec<QueueRecord>> {
        let mut args = vec![
            "list_queues".to_string(),
            "-q".to_string(),
            "-p".to_string(),
            vhost.to_string(),
        ];
        args.extend(QUEUE_COLUMNS.iter().map(|c| (*c).to_string()));

        let output = self.invoker.run(&self.tools.rabbitmqctl, &args)?;
        parse_queue_listing(&output, vhost, self.policy)
    }

    /// Full discovery: every queue in every vhost.
    pub fn discover(&self) -> Result<Snapshot> {
        let mut records = Vec::new();
        for vhost in self.list_virtual_hosts()? {
            let queues = self.list_queues(&vhost)?;
            log::debug!("vhost {vhost}: {} queue(s)", queues.len());
            records.extend(queues);
        }
        Ok(Snapshot::new(records))
    }
}

/// Parse the whole output of `list_queues` for one vhost.
pub fn parse_queue_listing(
    output: &str,
    vhost: &str,
    policy: DecodePolicy,
) -> Result<Vec<QueueRecord>> {
    let mut records = Vec::new();

    for line in output.lines() {
        match parse_queue_line(line, vhost) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) if policy == DecodePolicy::Skip && e.is_line_local() => {
                log::warn!("skipping queue listing line in vhost {vhost}: {e}");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(records)
}

/// Parse one tab-separated listing line.
///
/// Returns `Ok(None)` for lines that are not manageable queues: blank
/// lines, lines with an empty name, and federation-internal queues.
pub fn parse_queue_line(line: &str, vhost: &str) -> Result<Option<QueueRecord>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.starts_with(FEDERATION_PREFIX) {
        log::trace!("ignoring federation queue {line:?}");
        return Ok(None);
    }

    let mut fields = line.splitn(QUEUE_COLUMNS.len(), '\t');
    let name = fields.next().unwrap_or_default();
    if name.is_empty() {
        return Ok(None);
    }

    let (durable, auto_delete) = match (fields.next(), fields.next()) {
        (Some(durable), Some(auto_delete)) => (durable, auto_delete),
        _ => {
            return Err(Error::MalformedListing {
                vhost: vhost.to_string(),
                line: line.to_string(),
            });
        }
    };

    let arguments = match fields.next() {
        Some(text) => decode_arguments(text)?,
        None => Arguments::new(),
    };

    Ok(Some(QueueRecord {
        name: name.to_string(),
        vhost: vhost.to_string(),
        durable: durable.to_string(),
        auto_delete: auto_delete.to_string(),
        arguments,
        existence: Existence::Present,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockInvoker;
    use serde_json::json;

    #[test]
    fn test_listing_scenario() {
        let output = "federation: foo\nq1\ttrue\tfalse\t[{\"x-max-length\",10}]";
        let records = parse_queue_listing(output, "/", DecodePolicy::Fail).unwrap();

        assert_eq!(records.len(), 1);
        let q = &records[0];
        assert_eq!(q.name, "q1");
        assert_eq!(q.durable, "true");
        assert_eq!(q.auto_delete, "false");
        assert_eq!(q.arguments.get("x-max-length"), Some(&json!(10)));
        assert_eq!(q.identifier(), "q1@/");
        assert_eq!(q.existence, Existence::Present);
    }

    #[test]
    fn test_federation_lines_never_returned() {
        let output = "federation: upstream-a\tfalse\tfalse\t[]\n\
                      federation:x\ttrue\ttrue\t[]\n\
                      jobs\ttrue\tfalse\t[]";
        let records = parse_queue_listing(output, "/", DecodePolicy::Fail).unwrap();
        assert!(records.iter().all(|r| !r.name.starts_with(FEDERATION_PREFIX)));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_blank_lines_and_empty_names_dropped() {
        let output = "\n\tfalse\tfalse\t[]\nq2\tfalse\ttrue\t[]\n";
        let records = parse_queue_listing(output, "/", DecodePolicy::Fail).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].auto_delete, "true");
    }

    #[test]
    fn test_missing_arguments_column_is_empty() {
        let record = parse_queue_line("q1\ttrue\tfalse", "/").unwrap().unwrap();
        assert!(record.arguments.is_empty());
    }

    #[test]
    fn test_missing_flags_is_malformed() {
        let err = parse_queue_line("q1\ttrue", "/").unwrap_err();
        assert!(matches!(err, Error::MalformedListing { .. }));
    }

    #[test]
    fn test_decode_error_fails_by_default() {
        let output = "bad\ttrue\tfalse\t[{oops,1}]\ngood\ttrue\tfalse\t[]";
        let err = parse_queue_listing(output, "/", DecodePolicy::Fail).unwrap_err();
        assert!(matches!(err, Error::ArgumentDecode { .. }));
    }

    #[test]
    fn test_decode_error_skipped_under_skip_policy() {
        let output = "bad\ttrue\tfalse\t[{oops,1}]\ngood\ttrue\tfalse\t[]";
        let records = parse_queue_listing(output, "/", DecodePolicy::Skip).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "good");
    }

    #[test]
    fn test_discover_queries_each_vhost_once() {
        let mock = MockInvoker::new()
            .respond("rabbitmqctl list_vhosts -q", "/\n/prod\n")
            .respond("rabbitmqctl list_queues -q -p / ", "q1\ttrue\tfalse\t[]\n")
            .respond(
                "rabbitmqctl list_queues -q -p /prod ",
                "orders\ttrue\tfalse\t[{\"x-queue-type\",\"quorum\"}]\n",
            );
        let tools = ToolPaths {
            rabbitmqctl: "rabbitmqctl".into(),
            ..ToolPaths::default()
        };

        let snapshot = Inventory::new(&mock, &tools, DecodePolicy::Fail)
            .discover()
            .unwrap();

        let ids: Vec<_> = snapshot.records().iter().map(QueueRecord::identifier).collect();
        assert_eq!(ids, vec!["q1@/", "orders@/prod"]);
        assert_eq!(mock.calls().len(), 3);
        assert_eq!(
            mock.calls()[2].command_line(),
            "rabbitmqctl list_queues -q -p /prod name durable auto_delete arguments"
        );
    }
}
