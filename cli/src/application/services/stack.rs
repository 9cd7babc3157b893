//! Application service: compose the stack from stored configuration.

use anyhow::{Context, Result};
use serde::Serialize;
use stackcraft_common::{
    LogicalId, PolicyStatement, ResourceGraph, ResourceKind, ResourceProperties,
};

use crate::application::ports::ConfigStore;
use crate::domain::composer::compose;
use crate::domain::config::{DeployParameters, StackConfig, validate_target};
use crate::domain::fingerprint::graph_fingerprint;

/// Load the configuration and apply deploy-time parameters.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
pub fn resolve_config(store: &impl ConfigStore, params: &DeployParameters) -> Result<StackConfig> {
    Ok(store.load()?.with_parameters(params))
}

/// Compose the resource graph for `config`.
///
/// Composition errors are returned as [`CompositionError`](crate::domain::CompositionError)
/// inside the `anyhow::Error` so callers can downcast them.
///
/// # Errors
///
/// Returns an error if the deployment target is invalid or composition is
/// rejected.
pub fn synthesize(config: &StackConfig) -> Result<ResourceGraph> {
    let target = validate_target(&config.target)?;
    Ok(compose(config, target)?)
}

/// Statements granted to the deploy principal, as declared in a graph.
#[derive(Debug, Clone, Serialize)]
pub struct GrantReport {
    pub principal: String,
    pub grant: String,
    pub statements: Vec<PolicyStatement>,
}

/// The access grants bound to the graph's deploy principals.
///
/// # Errors
///
/// Returns an error if the graph holds no access grant.
pub fn principal_grants(graph: &ResourceGraph) -> Result<Vec<GrantReport>> {
    let reports: Vec<GrantReport> = graph
        .resources
        .iter()
        .filter_map(|resource| match &resource.properties {
            ResourceProperties::AccessGrant(grant) => Some(GrantReport {
                principal: grant.principal.target.name().to_string(),
                grant: grant.name.clone(),
                statements: grant.statements.clone(),
            }),
            _ => None,
        })
        .collect();
    if reports.is_empty() {
        anyhow::bail!("stack '{}' declares no access grant", graph.stack);
    }
    Ok(reports)
}

/// One line of a [`GraphSummary`].
#[derive(Debug, Clone, Serialize)]
pub struct SummaryEntry {
    pub id: LogicalId,
    pub kind: ResourceKind,
    pub retained: bool,
}

/// What `validate` reports about a composed graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub stack: String,
    pub account: String,
    pub region: String,
    pub fingerprint: String,
    pub resources: Vec<SummaryEntry>,
}

/// Summarize `graph` with its fingerprint.
///
/// # Errors
///
/// Returns an error if the graph cannot be serialized for fingerprinting.
pub fn summarize(graph: &ResourceGraph) -> Result<GraphSummary> {
    let fingerprint = graph_fingerprint(graph).context("fingerprinting graph")?;
    Ok(GraphSummary {
        stack: graph.stack.clone(),
        account: graph.target.account.clone(),
        region: graph.target.region.clone(),
        fingerprint,
        resources: graph
            .resources
            .iter()
            .map(|r| SummaryEntry {
                id: r.id.clone(),
                kind: r.kind(),
                retained: r.is_retained(),
            })
            .collect(),
    })
}
