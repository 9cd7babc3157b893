//! Application service: apply a composed graph through the provisioning backend.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use serde::Serialize;
use stackcraft_common::{LogicalId, ResourceGraph, ResourceKind};
use tracing::info;

use crate::application::ports::{ApplyAction, ProgressReporter, ProvisioningBackend};

/// One resource as applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedResource {
    pub id: LogicalId,
    pub kind: ResourceKind,
    pub physical_id: String,
    pub action: ApplyAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeployOutcome {
    pub applied: Vec<AppliedResource>,
    /// Previously deployed resources no longer declared, now deleted.
    pub removed: Vec<LogicalId>,
    /// Previously deployed retained resources no longer declared. Left in
    /// place for `purge-retained`.
    pub orphaned: Vec<LogicalId>,
}

impl DeployOutcome {
    #[must_use]
    pub fn count(&self, action: ApplyAction) -> usize {
        self.applied.iter().filter(|r| r.action == action).count()
    }
}

/// Apply every resource in emission order, then remove stale ones.
///
/// Each resource receives the physical IDs of the resources it depends on.
///
/// # Errors
///
/// Returns an error on the first backend failure. Resources applied before
/// the failure stay applied; rolling them back is the backend's concern.
pub async fn deploy(
    backend: &impl ProvisioningBackend,
    reporter: &impl ProgressReporter,
    graph: &ResourceGraph,
) -> Result<DeployOutcome> {
    let mut outcome = DeployOutcome::default();
    let mut physical: BTreeMap<LogicalId, String> = BTreeMap::new();

    for resource in &graph.resources {
        let mut resolved = BTreeMap::new();
        for dep in &resource.depends_on {
            let id = physical.get(dep).with_context(|| {
                format!("{} depends on {dep}, which has not been applied", resource.id)
            })?;
            resolved.insert(dep.clone(), id.clone());
        }

        reporter.step(&format!("applying {}...", resource.id));
        let materialized = backend
            .upsert(&graph.target, &graph.stack, resource, &resolved)
            .await
            .with_context(|| format!("applying {}", resource.id))?;
        info!(
            id = %resource.id,
            physical_id = %materialized.physical_id,
            action = %materialized.action,
            "applied"
        );

        physical.insert(resource.id.clone(), materialized.physical_id.clone());
        outcome.applied.push(AppliedResource {
            id: resource.id.clone(),
            kind: resource.kind(),
            physical_id: materialized.physical_id,
            action: materialized.action,
        });
    }

    let declared: HashSet<&LogicalId> = graph.resources.iter().map(|r| &r.id).collect();
    let deployed = backend
        .list(&graph.stack)
        .await
        .context("listing deployed resources")?;
    for stale in deployed.iter().rev().filter(|d| !declared.contains(&d.id)) {
        if stale.retained {
            reporter.warn(&format!(
                "{} is no longer declared but is retained; remove it with purge-retained",
                stale.id
            ));
            outcome.orphaned.push(stale.id.clone());
            continue;
        }
        reporter.step(&format!("removing {}...", stale.id));
        backend
            .delete(&graph.stack, &stale.id)
            .await
            .with_context(|| format!("removing {}", stale.id))?;
        info!(id = %stale.id, "removed stale resource");
        outcome.removed.push(stale.id.clone());
    }

    reporter.success(&format!(
        "stack '{}' deployed: {} created, {} updated, {} unchanged",
        graph.stack,
        outcome.count(ApplyAction::Created),
        outcome.count(ApplyAction::Updated),
        outcome.count(ApplyAction::Unchanged)
    ));
    Ok(outcome)
}
