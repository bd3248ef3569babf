//! Core types for queue discovery and convergence.

use crate::arguments::Arguments;
use crate::identity::QueueId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Default path of the admin tool.
pub const DEFAULT_RABBITMQADMIN: &str = "/usr/local/bin/rabbitmqadmin";

/// Default path of the control tool (resolved through PATH).
pub const DEFAULT_RABBITMQCTL: &str = "rabbitmqctl";

/// Default config file handed to the admin tool with `-c`.
pub const DEFAULT_ADMIN_CONFIG: &str = "/etc/rabbitmq/rabbitmqadmin.conf";

/// Writable HOME the tools are run with.
pub const DEFAULT_TOOL_HOME: &str = "/tmp";

/// Whether a queue exists on the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Existence {
    /// Queue exists
    Present,
    /// Queue does not exist
    Absent,
}

impl fmt::Display for Existence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Existence::Present => write!(f, "present"),
            Existence::Absent => write!(f, "absent"),
        }
    }
}

/// A queue as reported by `rabbitmqctl list_queues`.
///
/// `durable` and `auto_delete` keep the broker's own literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueRecord {
    pub name: String,
    pub vhost: String,
    pub durable: String,
    pub auto_delete: String,
    pub arguments: Arguments,
    pub existence: Existence,
}

impl QueueRecord {
    /// Composite identity of this queue.
    pub fn id(&self) -> QueueId {
        QueueId::new(&self.name, &self.vhost)
    }

    /// Identifier string used for matching (`name@vhost`).
    pub fn identifier(&self) -> String {
        self.id().identifier()
    }

    /// Properties where this queue differs from the desired spec.
    ///
    /// The broker refuses to redeclare a queue with different properties,
    /// so drift is reported and never converged automatically.
    pub fn drift(&self, desired: &DesiredQueue) -> Vec<PropertyDrift> {
        let mut drift = Vec::new();

        if !flag_matches(&self.durable, desired.durable) {
            drift.push(PropertyDrift::new(
                "durable",
                &self.durable,
                desired.durable.to_string(),
            ));
        }
        if !flag_matches(&self.auto_delete, desired.auto_delete) {
            drift.push(PropertyDrift::new(
                "auto_delete",
                &self.auto_delete,
                desired.auto_delete.to_string(),
            ));
        }

        let wanted = desired.arguments_or_default();
        if self.arguments != wanted {
            drift.push(PropertyDrift::new(
                "arguments",
                serde_json::Value::Object(self.arguments.clone()).to_string(),
                serde_json::Value::Object(wanted).to_string(),
            ));
        }

        drift
    }
}

fn flag_matches(observed: &str, desired: bool) -> bool {
    observed.trim().eq_ignore_ascii_case(if desired { "true" } else { "false" })
}

/// One property that differs between broker and desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDrift {
    pub property: &'static str,
    pub observed: String,
    pub desired: String,
}

impl PropertyDrift {
    fn new(
        property: &'static str,
        observed: impl Into<String>,
        desired: impl Into<String>,
    ) -> Self {
        Self {
            property,
            observed: observed.into(),
            desired: desired.into(),
        }
    }
}

impl fmt::Display for PropertyDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.property, self.observed, self.desired)
    }
}

/// Desired presence of a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

impl Ensure {
    /// The existence this setting asks for.
    pub fn existence(self) -> Existence {
        match self {
            Ensure::Present => Existence::Present,
            Ensure::Absent => Existence::Absent,
        }
    }
}

/// A queue as declared in the desired-state manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DesiredQueue {
    /// `name@vhost`, or a bare name resolved against the default vhost
    pub name: String,
    #[serde(default)]
    pub ensure: Ensure,
    /// Explicit vhost, overriding whatever the identifier carries
    #[serde(default)]
    pub vhost: Option<String>,
    #[serde(default, deserialize_with = "boolish")]
    pub durable: bool,
    #[serde(default, deserialize_with = "boolish")]
    pub auto_delete: bool,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl DesiredQueue {
    /// A present, non-durable queue with no arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: Ensure::Present,
            vhost: None,
            durable: false,
            auto_delete: false,
            arguments: None,
            user: None,
            password: None,
        }
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = ensure;
        self
    }

    pub fn with_durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    pub fn with_auto_delete(mut self, auto_delete: bool) -> Self {
        self.auto_delete = auto_delete;
        self
    }

    pub fn with_arguments(mut self, arguments: Arguments) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn with_vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = Some(vhost.into());
        self
    }

    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Desired arguments, empty when unset.
    pub fn arguments_or_default(&self) -> Arguments {
        self.arguments.clone().unwrap_or_default()
    }
}

/// Accept `true`, `"true"`, `"yes"` and friends.
fn boolish<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Boolish {
        Bool(bool),
        Text(String),
    }

    match Boolish::deserialize(deserializer)? {
        Boolish::Bool(b) => Ok(b),
        Boolish::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected a boolean, found {other:?}"
            ))),
        },
    }
}

/// What to do when a listing line's arguments cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Abort discovery with the decode error
    #[default]
    Fail,
    /// Log a warning and leave the line out of the snapshot
    Skip,
}

/// Locations of the broker tools and the environment they run in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub rabbitmqctl: String,
    pub rabbitmqadmin: String,
    /// HOME for tool invocations; rabbitmqadmin writes state there
    pub home: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            rabbitmqctl: DEFAULT_RABBITMQCTL.to_string(),
            rabbitmqadmin: DEFAULT_RABBITMQADMIN.to_string(),
            home: DEFAULT_TOOL_HOME.to_string(),
        }
    }
}

/// Settings shared by every admin-tool invocation in a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub user: String,
    pub password: String,
    pub config_file: String,
    pub default_vhost: String,
    pub on_decode_error: DecodePolicy,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            user: "guest".to_string(),
            password: "guest".to_string(),
            config_file: DEFAULT_ADMIN_CONFIG.to_string(),
            default_vhost: "/".to_string(),
            on_decode_error: DecodePolicy::Fail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(durable: &str, auto_delete: &str, arguments: Arguments) -> QueueRecord {
        QueueRecord {
            name: "q1".into(),
            vhost: "/".into(),
            durable: durable.into(),
            auto_delete: auto_delete.into(),
            arguments,
            existence: Existence::Present,
        }
    }

    #[test]
    fn test_record_identifier() {
        assert_eq!(record("true", "false", Arguments::new()).identifier(), "q1@/");
    }

    #[test]
    fn test_no_drift() {
        let desired = DesiredQueue::new("q1@/").with_durable(true);
        assert!(record("true", "false", Arguments::new()).drift(&desired).is_empty());
    }

    #[test]
    fn test_drift_reports_each_property() {
        let mut args = Arguments::new();
        args.insert("x-max-length".into(), json!(10));
        let desired = DesiredQueue::new("q1@/").with_auto_delete(true);

        let drift = record("true", "false", args).drift(&desired);
        let properties: Vec<_> = drift.iter().map(|d| d.property).collect();
        assert_eq!(properties, vec!["durable", "auto_delete", "arguments"]);
        assert_eq!(drift[0].to_string(), "durable: true -> false");
    }

    #[test]
    fn test_boolish_deserialize() {
        let q: DesiredQueue =
            serde_json::from_str(r#"{"name":"q","durable":"yes","auto_delete":false}"#).unwrap();
        assert!(q.durable);
        assert!(!q.auto_delete);
        assert_eq!(q.ensure, Ensure::Present);

        let err = serde_json::from_str::<DesiredQueue>(r#"{"name":"q","durable":"maybe"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = AdminSettings::default();
        assert_eq!(settings.config_file, "/etc/rabbitmq/rabbitmqadmin.conf");
        assert_eq!(settings.on_decode_error, DecodePolicy::Fail);
        assert_eq!(ToolPaths::default().home, "/tmp");
    }
}
