use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of infrastructure entity declared in a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Network,
    SecurityGroup,
    ImageRegistry,
    DeployPrincipal,
    ExecutionRole,
    AccessGrant,
    ComputeCluster,
    WorkloadDefinition,
    Service,
    LoadBalancer,
    TargetGroup,
    Listener,
}

impl ResourceKind {
    /// Short lowercase prefix used in logical IDs (e.g. `service/web`).
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::SecurityGroup => "security-group",
            Self::ImageRegistry => "registry",
            Self::DeployPrincipal => "principal",
            Self::ExecutionRole => "role",
            Self::AccessGrant => "grant",
            Self::ComputeCluster => "cluster",
            Self::WorkloadDefinition => "workload",
            Self::Service => "service",
            Self::LoadBalancer => "load-balancer",
            Self::TargetGroup => "target-group",
            Self::Listener => "listener",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "NetworkTopology",
            Self::SecurityGroup => "SecurityGroup",
            Self::ImageRegistry => "ImageRegistry",
            Self::DeployPrincipal => "DeployPrincipal",
            Self::ExecutionRole => "ExecutionRole",
            Self::AccessGrant => "AccessGrant",
            Self::ComputeCluster => "ComputeCluster",
            Self::WorkloadDefinition => "WorkloadDefinition",
            Self::Service => "Service",
            Self::LoadBalancer => "LoadBalancer",
            Self::TargetGroup => "TargetGroup",
            Self::Listener => "Listener",
        };
        f.write_str(name)
    }
}

/// Graph-unique identifier of a declared resource: `<kind slug>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    #[must_use]
    pub fn new(kind: ResourceKind, name: &str) -> Self {
        Self(format!("{}/{name}", kind.slug()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name part after the kind prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attribute of a materialized resource that another resource may consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Stable provider identifier (ARN-equivalent).
    Arn,
    /// Short provider identifier (e.g. `vpc-…`, `sg-…`).
    Id,
    /// Provider-side name.
    Name,
}

/// Reference from one resource to an attribute of an earlier one.
///
/// The backend substitutes the value it returned for `target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub target: LogicalId,
    pub attribute: Attribute,
}

impl ResourceRef {
    #[must_use]
    pub fn arn(target: &LogicalId) -> Self {
        Self {
            target: target.clone(),
            attribute: Attribute::Arn,
        }
    }

    #[must_use]
    pub fn id(target: &LogicalId) -> Self {
        Self {
            target: target.clone(),
            attribute: Attribute::Id,
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attr = match self.attribute {
            Attribute::Arn => "arn",
            Attribute::Id => "id",
            Attribute::Name => "name",
        };
        write!(f, "${{{}.{attr}}}", self.target)
    }
}
