use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::{LogicalId, ResourceKind, ResourceRef};
use crate::policy::{PolicyResource, PolicyStatement};

// ── Shared enums ─────────────────────────────────────────────────────────────

/// What happens to a resource when its deployment unit is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    #[default]
    Destroy,
    /// Kept across redeployments; deleted only by an explicit purge.
    Retain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetVisibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    #[default]
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationProtocol {
    Http,
    #[default]
    Https,
}

impl ApplicationProtocol {
    #[must_use]
    pub fn is_secure(self) -> bool {
        matches!(self, Self::Https)
    }
}

impl fmt::Display for ApplicationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Bridge,
    Host,
    Awsvpc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Instance,
    Ip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagMutability {
    #[default]
    Mutable,
    Immutable,
}

// ── Placement ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadField {
    InstanceId,
    AvailabilityZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinpackField {
    Memory,
    Cpu,
}

/// How service instances are distributed across cluster capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "field", rename_all = "snake_case")]
pub enum PlacementStrategy {
    Spread(SpreadField),
    Binpack(BinpackField),
    Random,
}

impl Default for PlacementStrategy {
    fn default() -> Self {
        Self::Spread(SpreadField::InstanceId)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown placement strategy '{0}' (expected spread-instance, spread-zone, binpack-memory, binpack-cpu or random)")]
pub struct ParsePlacementError(pub String);

impl FromStr for PlacementStrategy {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spread-instance" => Ok(Self::Spread(SpreadField::InstanceId)),
            "spread-zone" => Ok(Self::Spread(SpreadField::AvailabilityZone)),
            "binpack-memory" => Ok(Self::Binpack(BinpackField::Memory)),
            "binpack-cpu" => Ok(Self::Binpack(BinpackField::Cpu)),
            "random" => Ok(Self::Random),
            other => Err(ParsePlacementError(other.to_string())),
        }
    }
}

impl fmt::Display for PlacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Spread(SpreadField::InstanceId) => "spread-instance",
            Self::Spread(SpreadField::AvailabilityZone) => "spread-zone",
            Self::Binpack(BinpackField::Memory) => "binpack-memory",
            Self::Binpack(BinpackField::Cpu) => "binpack-cpu",
            Self::Random => "random",
        })
    }
}

// ── Per-kind properties ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetProperties {
    pub zone: u8,
    pub cidr: String,
    pub visibility: SubnetVisibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProperties {
    pub cidr: String,
    pub zones: u8,
    pub subnets: Vec<SubnetProperties>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngressSource {
    Cidr(String),
    /// Members of another security group.
    Group(ResourceRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    pub protocol: TransportProtocol,
    pub port: u16,
    pub source: IngressSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupProperties {
    pub description: String,
    pub network: ResourceRef,
    pub ingress: Vec<IngressRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegistryProperties {
    pub name: String,
    pub scan_on_push: bool,
    pub tag_mutability: TagMutability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployPrincipalProperties {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRoleProperties {
    pub name: String,
    pub assumed_by: String,
    pub managed_policies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrantProperties {
    pub name: String,
    pub principal: ResourceRef,
    pub statements: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityProperties {
    pub instance_type: String,
    /// Maximum spot bid in USD/hour; `None` runs on-demand capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_price: Option<String>,
    pub min: u32,
    pub desired: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeClusterProperties {
    pub name: String,
    pub network: ResourceRef,
    pub security_group: ResourceRef,
    pub subnets: SubnetVisibility,
    pub capacity: CapacityProperties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
    #[serde(default)]
    pub protocol: TransportProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub registry: ResourceRef,
    pub tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerProperties {
    pub name: String,
    pub image: ImageReference,
    pub memory_mib: u32,
    pub port_mappings: Vec<PortMapping>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadDefinitionProperties {
    pub family: String,
    pub execution_role: ResourceRef,
    pub network_mode: NetworkMode,
    pub container: ContainerProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProperties {
    pub name: String,
    pub cluster: ResourceRef,
    pub workload: ResourceRef,
    pub desired_count: u32,
    pub placement: PlacementStrategy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerProperties {
    pub name: String,
    pub network: ResourceRef,
    pub security_group: ResourceRef,
    pub internet_facing: bool,
    pub subnets: SubnetVisibility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroupProperties {
    pub name: String,
    pub network: ResourceRef,
    /// Service whose tasks register as targets.
    pub service: ResourceRef,
    pub container_name: String,
    pub target_type: TargetType,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    pub health_check_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerProperties {
    pub load_balancer: ResourceRef,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    pub default_target_group: ResourceRef,
}

/// Typed properties, tagged with the entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceProperties {
    Network(NetworkProperties),
    SecurityGroup(SecurityGroupProperties),
    ImageRegistry(ImageRegistryProperties),
    DeployPrincipal(DeployPrincipalProperties),
    ExecutionRole(ExecutionRoleProperties),
    AccessGrant(AccessGrantProperties),
    ComputeCluster(ComputeClusterProperties),
    WorkloadDefinition(WorkloadDefinitionProperties),
    Service(ServiceProperties),
    LoadBalancer(LoadBalancerProperties),
    TargetGroup(TargetGroupProperties),
    Listener(ListenerProperties),
}

impl ResourceProperties {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Network(_) => ResourceKind::Network,
            Self::SecurityGroup(_) => ResourceKind::SecurityGroup,
            Self::ImageRegistry(_) => ResourceKind::ImageRegistry,
            Self::DeployPrincipal(_) => ResourceKind::DeployPrincipal,
            Self::ExecutionRole(_) => ResourceKind::ExecutionRole,
            Self::AccessGrant(_) => ResourceKind::AccessGrant,
            Self::ComputeCluster(_) => ResourceKind::ComputeCluster,
            Self::WorkloadDefinition(_) => ResourceKind::WorkloadDefinition,
            Self::Service(_) => ResourceKind::Service,
            Self::LoadBalancer(_) => ResourceKind::LoadBalancer,
            Self::TargetGroup(_) => ResourceKind::TargetGroup,
            Self::Listener(_) => ResourceKind::Listener,
        }
    }

    /// Every reference these properties hold, in field order.
    #[must_use]
    pub fn references(&self) -> Vec<&ResourceRef> {
        match self {
            Self::Network(_)
            | Self::ImageRegistry(_)
            | Self::DeployPrincipal(_)
            | Self::ExecutionRole(_) => Vec::new(),
            Self::SecurityGroup(p) => {
                let mut refs = vec![&p.network];
                refs.extend(p.ingress.iter().filter_map(|rule| match &rule.source {
                    IngressSource::Group(group) => Some(group),
                    IngressSource::Cidr(_) => None,
                }));
                refs
            }
            Self::AccessGrant(p) => {
                let mut refs = vec![&p.principal];
                for stmt in &p.statements {
                    refs.extend(stmt.resources.iter().filter_map(|r| match r {
                        PolicyResource::Ref(r) => Some(r),
                        PolicyResource::Any => None,
                    }));
                }
                refs
            }
            Self::ComputeCluster(p) => vec![&p.network, &p.security_group],
            Self::WorkloadDefinition(p) => vec![&p.execution_role, &p.container.image.registry],
            Self::Service(p) => vec![&p.cluster, &p.workload],
            Self::LoadBalancer(p) => vec![&p.network, &p.security_group],
            Self::TargetGroup(p) => vec![&p.network, &p.service],
            Self::Listener(p) => vec![&p.load_balancer, &p.default_target_group],
        }
    }
}

/// One declared resource in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: LogicalId,
    #[serde(default)]
    pub removal_policy: RemovalPolicy,
    /// Logical IDs this resource must be created after.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<LogicalId>,
    pub properties: ResourceProperties,
}

impl Resource {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.properties.kind()
    }

    #[must_use]
    pub fn is_retained(&self) -> bool {
        self.removal_policy == RemovalPolicy::Retain
    }
}
