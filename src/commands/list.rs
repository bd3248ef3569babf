//! `burrow list` - what the broker has right now.

use anyhow::{Context as _, Result};
use colored::Colorize;
use rabbitkit::{Client, QueueRecord};
use std::path::Path;

use super::client_for;
use crate::Context;
use crate::config::{self, Manifest};
use crate::ui;

pub fn run(ctx: &Context, vhost: Option<&str>) -> Result<()> {
    let manifest = match ctx.manifest.as_deref() {
        Some(path) => Some(load_explicit(path)?),
        None => load_default_if_present(&config::default_manifest_path()?)?,
    };
    let client = manifest.as_ref().map_or_else(Client::new, client_for);

    let queues: Vec<QueueRecord> = match vhost {
        Some(v) => client
            .list_queues(v)
            .with_context(|| format!("Failed to list queues in vhost {v}"))?,
        None => client
            .discover()
            .context("Failed to read queues from the broker")?
            .records()
            .to_vec(),
    };

    if queues.is_empty() {
        if !ctx.quiet {
            ui::info("No queues found");
        }
        return Ok(());
    }

    for queue in &queues {
        println!("{}", format_record(queue));
    }
    Ok(())
}

/// A manifest named with `--manifest` or `BURROW_MANIFEST` must load.
fn load_explicit(path: &Path) -> Result<Manifest> {
    let path = config::resolve_manifest_path(Some(path))?;
    Manifest::load(&path).with_context(|| format!("Failed to load manifest {}", path.display()))
}

/// Listing works without a manifest, but only when the default one is missing.
fn load_default_if_present(path: &Path) -> Result<Option<Manifest>> {
    if !path.exists() {
        log::debug!("no manifest at {}, using default tool settings", path.display());
        return Ok(None);
    }
    Manifest::load(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))
        .map(Some)
}

fn format_record(queue: &QueueRecord) -> String {
    let arguments = if queue.arguments.is_empty() {
        String::new()
    } else {
        format!(" {}", serde_json::Value::Object(queue.arguments.clone()))
    };
    format!(
        "{}  durable={} auto_delete={}{}",
        queue.identifier().bold(),
        queue.durable,
        queue.auto_delete,
        arguments.dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rabbitkit::{Arguments, Existence};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_manifest_must_exist() {
        let tmp = TempDir::new().unwrap();
        let err = load_explicit(&tmp.path().join("missing.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load manifest"));
    }

    #[test]
    fn test_explicit_manifest_must_parse() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queues.toml");
        fs::write(&path, "[[queue]\nname = ").unwrap();

        let err = load_explicit(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid TOML"));
    }

    #[test]
    fn test_missing_default_manifest_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let manifest = load_default_if_present(&tmp.path().join("queues.toml")).unwrap();
        assert!(manifest.is_none());
    }

    #[test]
    fn test_broken_default_manifest_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queues.toml");
        fs::write(&path, "[tools]\nrabbitmqctl = 3\n").unwrap();

        assert!(load_default_if_present(&path).is_err());
    }

    #[test]
    fn test_default_manifest_settings_used() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("queues.toml");
        fs::write(&path, "[tools]\nrabbitmqctl = \"/opt/sbin/rabbitmqctl\"\n").unwrap();

        let manifest = load_default_if_present(&path).unwrap().unwrap();
        assert_eq!(manifest.tools.rabbitmqctl, "/opt/sbin/rabbitmqctl");
    }

    #[test]
    fn test_format_record() {
        colored::control::set_override(false);
        let mut arguments = Arguments::new();
        arguments.insert("x-max-length".into(), serde_json::json!(10));
        let record = QueueRecord {
            name: "q1".into(),
            vhost: "/".into(),
            durable: "true".into(),
            auto_delete: "false".into(),
            arguments,
            existence: Existence::Present,
        };
        assert_eq!(
            format_record(&record),
            r#"q1@/  durable=true auto_delete=false {"x-max-length":10}"#
        );
    }
}
