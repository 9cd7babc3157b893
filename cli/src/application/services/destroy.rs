//! Application service: tear a stack down.
//!
//! `destroy` removes everything except retained resources. Retained
//! resources go only through `purge_retained`, and only once nothing else
//! of the stack is left.

use anyhow::{Context, Result};
use serde::Serialize;
use stackcraft_common::LogicalId;
use tracing::info;

use crate::application::ports::{ProgressReporter, ProvisioningBackend};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DestroyOutcome {
    pub deleted: Vec<LogicalId>,
    pub retained: Vec<LogicalId>,
}

/// Delete every non-retained resource of `stack` in reverse creation order.
///
/// # Errors
///
/// Returns an error on the first backend failure.
pub async fn destroy(
    backend: &impl ProvisioningBackend,
    reporter: &impl ProgressReporter,
    stack: &str,
) -> Result<DestroyOutcome> {
    let deployed = backend
        .list(stack)
        .await
        .context("listing deployed resources")?;
    let mut outcome = DestroyOutcome::default();

    for resource in deployed.iter().rev() {
        if resource.retained {
            outcome.retained.push(resource.id.clone());
            continue;
        }
        reporter.step(&format!("deleting {}...", resource.id));
        backend
            .delete(stack, &resource.id)
            .await
            .with_context(|| format!("deleting {}", resource.id))?;
        info!(id = %resource.id, "deleted");
        outcome.deleted.push(resource.id.clone());
    }

    if outcome.retained.is_empty() {
        reporter.success(&format!("stack '{stack}' destroyed"));
    } else {
        reporter.success(&format!(
            "stack '{stack}' destroyed; {} retained resource(s) kept",
            outcome.retained.len()
        ));
    }
    Ok(outcome)
}

/// Delete the retained resources of an otherwise destroyed stack.
///
/// # Errors
///
/// Refuses while non-retained resources of `stack` are still deployed, and
/// returns an error on the first backend failure.
pub async fn purge_retained(
    backend: &impl ProvisioningBackend,
    reporter: &impl ProgressReporter,
    stack: &str,
) -> Result<Vec<LogicalId>> {
    let deployed = backend
        .list(stack)
        .await
        .context("listing deployed resources")?;
    let live: Vec<&str> = deployed
        .iter()
        .filter(|r| !r.retained)
        .map(|r| r.id.as_str())
        .collect();
    if !live.is_empty() {
        anyhow::bail!(
            "stack '{stack}' still has {} deployed resource(s) ({}); run destroy first",
            live.len(),
            live.join(", ")
        );
    }

    let mut purged = Vec::new();
    for resource in deployed.iter().rev() {
        reporter.step(&format!("purging {}...", resource.id));
        backend
            .delete(stack, &resource.id)
            .await
            .with_context(|| format!("purging {}", resource.id))?;
        info!(id = %resource.id, "purged retained resource");
        purged.push(resource.id.clone());
    }
    if purged.is_empty() {
        reporter.success(&format!("stack '{stack}' has no retained resources"));
    } else {
        reporter.success(&format!("purged {} retained resource(s)", purged.len()));
    }
    Ok(purged)
}
