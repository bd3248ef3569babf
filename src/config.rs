//! Queue manifest: the desired state `burrow` converges to.

use anyhow::{Context, Result, bail};
use rabbitkit::{AdminSettings, DesiredQueue, QueueId, SEPARATOR, ToolPaths};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest location: ~/.config/burrow/queues.toml
pub fn default_manifest_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("burrow").join("queues.toml"))
}

/// Expand `~` in a user-supplied path, or fall back to the default.
pub fn resolve_manifest_path(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => {
            let raw = p.to_string_lossy();
            let expanded = shellexpand::tilde(&raw);
            Ok(PathBuf::from(expanded.as_ref()))
        }
        None => default_manifest_path(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub admin: AdminSettings,
    #[serde(default)]
    pub tools: ToolPaths,
    #[serde(default, rename = "queue")]
    pub queues: Vec<DesiredQueue>,
}

impl Manifest {
    /// Load a manifest, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let manifest: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?,
            _ => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?,
        };

        manifest.validate()?;
        Ok(manifest)
    }

    /// Every queue must resolve to a distinct `name@vhost`.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for queue in &self.queues {
            let id = QueueId::parse(&queue.name, queue.vhost.as_deref(), &self.admin.default_vhost)
                .with_context(|| format!("Invalid queue '{}'", queue.name))?;
            // A full identifier is matched verbatim, so it is also the dedup key
            let key = match queue.vhost {
                None if queue.name.contains(SEPARATOR) => queue.name.clone(),
                _ => id.identifier(),
            };
            if !seen.insert(key.clone()) {
                bail!("Queue {key} is declared more than once");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rabbitkit::{DecodePolicy, Ensure};
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_toml() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "queues.toml",
            r#"
[admin]
user = "admin"
password = "secret"
on_decode_error = "skip"

[tools]
rabbitmqadmin = "/opt/bin/rabbitmqadmin"

[[queue]]
name = "orders@/prod"
durable = true
arguments = { "x-max-length" = 10 }

[[queue]]
name = "scratch"
ensure = "absent"
auto_delete = "yes"
"#,
        );

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.admin.user, "admin");
        assert_eq!(manifest.admin.on_decode_error, DecodePolicy::Skip);
        assert_eq!(manifest.admin.config_file, "/etc/rabbitmq/rabbitmqadmin.conf");
        assert_eq!(manifest.tools.rabbitmqadmin, "/opt/bin/rabbitmqadmin");
        assert_eq!(manifest.tools.rabbitmqctl, "rabbitmqctl");
        assert_eq!(manifest.queues.len(), 2);
        assert!(manifest.queues[0].durable);
        assert_eq!(
            manifest.queues[0].arguments.as_ref().unwrap().get("x-max-length"),
            Some(&json!(10))
        );
        assert_eq!(manifest.queues[1].ensure, Ensure::Absent);
        assert!(manifest.queues[1].auto_delete);
    }

    #[test]
    fn test_load_json() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "queues.json",
            r#"{"queue": [{"name": "jobs@/", "durable": "true"}]}"#,
        );

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.queues[0].name, "jobs@/");
        assert!(manifest.queues[0].durable);
        assert_eq!(manifest.admin.user, "guest");
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "queues.toml",
            r#"
[[queue]]
name = "jobs"

[[queue]]
name = "jobs@/"
"#,
        );

        let err = Manifest::load(&path).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_invalid_identifier_rejected() {
        let manifest = Manifest {
            queues: vec![DesiredQueue::new("@/prod")],
            ..Manifest::default()
        };
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_names_containing_separator_are_distinct() {
        let manifest = Manifest {
            queues: vec![DesiredQueue::new("a@b@/"), DesiredQueue::new("a@c@/")],
            ..Manifest::default()
        };
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = Manifest::load(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let path = resolve_manifest_path(Some(Path::new("/etc/burrow/queues.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/burrow/queues.toml"));
    }
}
