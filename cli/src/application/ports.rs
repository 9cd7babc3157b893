//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared graph types,
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use stackcraft_common::{DeploymentTarget, LogicalId, Resource, ResourceKind};

use crate::domain::config::StackConfig;

// ── Value Types ───────────────────────────────────────────────────────────────

/// What the backend did with one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    Created,
    Updated,
    Unchanged,
}

impl fmt::Display for ApplyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Result of materializing one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Stable identifier later resources reference.
    pub physical_id: String,
    pub action: ApplyAction,
}

/// A resource the backend currently tracks for a stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedResource {
    pub id: LogicalId,
    pub kind: ResourceKind,
    pub physical_id: String,
    pub retained: bool,
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts loading and saving the stack configuration file.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if no file exists.
    fn load(&self) -> Result<StackConfig>;
    /// Persist the configuration.
    fn save(&self, config: &StackConfig) -> Result<()>;
    /// Path of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}

// ── Provisioning Port ─────────────────────────────────────────────────────────

/// The provisioning backend that materializes resource graphs.
///
/// Implementations own deployed-state tracking and must serialize mutations
/// of the same stack.
#[allow(async_fn_in_trait)]
pub trait ProvisioningBackend {
    /// Create or update `resource`.
    ///
    /// `resolved` maps every logical ID the resource depends on to the
    /// physical ID returned when it was materialized.
    async fn upsert(
        &self,
        target: &DeploymentTarget,
        stack: &str,
        resource: &Resource,
        resolved: &BTreeMap<LogicalId, String>,
    ) -> Result<Materialized>;

    /// Delete a tracked resource by logical ID. Deleting an unknown ID is a no-op.
    async fn delete(&self, stack: &str, id: &LogicalId) -> Result<()>;

    /// Resources currently tracked for `stack`, in creation order.
    async fn list(&self, stack: &str) -> Result<Vec<DeployedResource>>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
