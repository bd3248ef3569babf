//! CLI commands. Each one runs at most a single reconciliation pass.

pub mod apply;
pub mod diff;
pub mod list;
pub mod status;

use anyhow::{Context as _, Result};
use declarative::ExecutionPlan;
use rabbitkit::Client;

use crate::Context;
use crate::config::{self, Manifest};
use crate::resource::build_plan;

/// Load the manifest named on the command line (or the default one).
fn load_manifest(ctx: &Context) -> Result<Manifest> {
    let path = config::resolve_manifest_path(ctx.manifest.as_deref())?;
    log::debug!("loading manifest {}", path.display());
    Manifest::load(&path)
}

fn client_for(manifest: &Manifest) -> Client {
    Client::with_settings(manifest.tools.clone(), manifest.admin.clone())
}

/// Discover the broker once and bind the manifest against it.
fn prepare(ctx: &Context, target: Option<&str>) -> Result<ExecutionPlan> {
    let manifest = load_manifest(ctx)?;
    let client = client_for(&manifest);

    let snapshot = client
        .discover()
        .context("Failed to read queues from the broker")?;
    log::info!("discovered {} queue(s)", snapshot.len());

    let bindings = client.bind(&snapshot, manifest.queues)?;
    Ok(build_plan(bindings, &client.engine()).filter_by_target(target))
}
