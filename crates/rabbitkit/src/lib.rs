//! # rabbitkit
//!
//! Discover and converge RabbitMQ queues through the broker's own CLI tools.
//!
//! This crate provides functionality for:
//! - Decoding the `arguments` column of `rabbitmqctl list_queues`
//! - Listing vhosts and queues into typed records
//! - Matching desired queues to discovered ones by `name@vhost`
//! - Declaring and deleting queues with `rabbitmqadmin`, idempotently
//!
//! ## Example
//!
//! ```no_run
//! use rabbitkit::{Client, DesiredQueue};
//!
//! let client = Client::new();
//! let snapshot = client.discover().expect("discovery failed");
//!
//! let desired = vec![DesiredQueue::new("orders@/prod").with_durable(true)];
//! let mut bindings = client.bind(&snapshot, desired).expect("bad identifier");
//!
//! for binding in &mut bindings {
//!     let transition = client.converge(binding).expect("transition failed");
//!     println!("{}: {transition}", binding.id);
//! }
//! ```

#![warn(clippy::all)]

pub mod arguments;
pub mod backend;
pub mod error;
pub mod identity;
pub mod inventory;
pub mod matcher;
pub mod transition;
pub mod types;

pub use arguments::{Arguments, decode_arguments, encode_arguments};
pub use error::{Error, ErrorCategory, Result};
pub use identity::{QueueId, SEPARATOR};
pub use matcher::{QueueBinding, Snapshot, bind};
pub use transition::{Transition, TransitionEngine, plan};
pub use types::{
    AdminSettings, DecodePolicy, DesiredQueue, Ensure, Existence, PropertyDrift, QueueRecord,
    ToolPaths,
};

use backend::CommandInvoker;
use inventory::Inventory;
use std::sync::Arc;

/// High-level client for one broker.
///
/// The client holds the invoker and settings for a whole process and
/// exposes the discover -> bind -> converge steps of a pass.
#[derive(Clone)]
pub struct Client {
    invoker: Arc<dyn CommandInvoker>,
    tools: ToolPaths,
    admin: AdminSettings,
}

impl Client {
    /// Create a client that runs the real tools with default settings.
    pub fn new() -> Self {
        Self::with_settings(ToolPaths::default(), AdminSettings::default())
    }

    /// Create a client that runs the real tools with the given settings.
    pub fn with_settings(tools: ToolPaths, admin: AdminSettings) -> Self {
        let invoker = backend::process::ProcessInvoker::new().env("HOME", &tools.home);
        Self::with_invoker(Arc::new(invoker), tools, admin)
    }

    /// Create a client with a custom invoker (useful for testing).
    pub fn with_invoker(
        invoker: Arc<dyn CommandInvoker>,
        tools: ToolPaths,
        admin: AdminSettings,
    ) -> Self {
        Self {
            invoker,
            tools,
            admin,
        }
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    pub fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    fn inventory(&self) -> Inventory<'_> {
        Inventory::new(
            self.invoker.as_ref(),
            &self.tools,
            self.admin.on_decode_error,
        )
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// List virtual hosts.
    pub fn list_virtual_hosts(&self) -> Result<Vec<String>> {
        self.inventory().list_virtual_hosts()
    }

    /// List the queues of one virtual host.
    pub fn list_queues(&self, vhost: &str) -> Result<Vec<QueueRecord>> {
        self.inventory().list_queues(vhost)
    }

    /// Discover every queue in every vhost.
    pub fn discover(&self) -> Result<Snapshot> {
        self.inventory().discover()
    }

    // =========================================================================
    // Matching and transitions
    // =========================================================================

    /// Bind desired queues to the snapshot.
    pub fn bind(
        &self,
        snapshot: &Snapshot,
        desired: Vec<DesiredQueue>,
    ) -> Result<Vec<QueueBinding>> {
        matcher::bind(snapshot, desired, &self.admin.default_vhost)
    }

    /// A transition engine sharing this client's invoker and settings.
    pub fn engine(&self) -> TransitionEngine {
        TransitionEngine::new(
            Arc::clone(&self.invoker),
            self.tools.clone(),
            self.admin.clone(),
        )
    }

    /// Converge one binding.
    pub fn converge(&self, binding: &mut QueueBinding) -> Result<Transition> {
        self.engine().converge(binding)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
