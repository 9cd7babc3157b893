//! Declaration inputs for each entity kind.
//!
//! Cross-entity links are [`Handle`]s, never names.

use stackcraft_common::{
    ApplicationProtocol, NetworkMode, PlacementStrategy, PortMapping, ResourceKind,
};

use super::handle::{Declared, Handle};

#[derive(Debug, Clone)]
pub struct NetworkTopology {
    pub name: String,
    pub cidr: String,
    pub zones: u8,
    pub subnet_mask: u8,
    pub public_subnets: bool,
    pub private_subnets: bool,
}

#[derive(Debug, Clone)]
pub enum IngressFrom {
    Cidr(String),
    Group(Handle<SecurityGroup>),
}

#[derive(Debug, Clone)]
pub struct Ingress {
    pub port: u16,
    pub from: IngressFrom,
}

#[derive(Debug, Clone)]
pub struct SecurityGroup {
    pub name: String,
    pub description: String,
    pub network: Handle<NetworkTopology>,
    pub ingress: Vec<Ingress>,
}

#[derive(Debug, Clone)]
pub struct ImageRegistry {
    pub name: String,
    pub scan_on_push: bool,
    pub immutable_tags: bool,
}

#[derive(Debug, Clone)]
pub struct DeployPrincipal {
    pub name: String,
}

/// Identity the container agent assumes to pull images and ship logs.
#[derive(Debug, Clone)]
pub struct ExecutionRole {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CapacitySpec {
    pub instance_type: String,
    pub instance_memory_mib: Option<u32>,
    pub spot_price: Option<String>,
    pub min: u32,
    pub desired: u32,
    pub max: u32,
}

#[derive(Debug, Clone)]
pub struct ComputeCluster {
    pub name: String,
    pub network: Handle<NetworkTopology>,
    pub security_group: Handle<SecurityGroup>,
    pub capacity: CapacitySpec,
}

/// A single-container task definition.
///
/// The first port mapping is the one the load balancer routes to.
#[derive(Debug, Clone)]
pub struct WorkloadDefinition {
    pub name: String,
    pub execution_role: Handle<ExecutionRole>,
    pub registry: Handle<ImageRegistry>,
    pub image_tag: String,
    pub container_name: String,
    pub memory_mib: u32,
    pub network_mode: NetworkMode,
    pub port_mappings: Vec<PortMapping>,
    pub command: Vec<String>,
}

impl WorkloadDefinition {
    #[must_use]
    pub fn primary_port(&self) -> Option<&PortMapping> {
        self.port_mappings.first()
    }
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub cluster: Handle<ComputeCluster>,
    pub workload: Handle<WorkloadDefinition>,
    pub desired_count: u32,
    pub placement: PlacementStrategy,
}

#[derive(Debug, Clone)]
pub struct LoadBalancer {
    pub name: String,
    pub network: Handle<NetworkTopology>,
    pub security_group: Handle<SecurityGroup>,
    pub internet_facing: bool,
}

#[derive(Debug, Clone)]
pub struct TargetGroup {
    pub name: String,
    pub service: Handle<Service>,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    pub health_check_path: String,
}

#[derive(Debug, Clone)]
pub struct Listener {
    pub name: String,
    pub load_balancer: Handle<LoadBalancer>,
    pub port: u16,
    pub protocol: ApplicationProtocol,
    pub certificate: Option<String>,
    pub default_target_groups: Vec<Handle<TargetGroup>>,
}

/// Something the deploy principal must be able to act on.
#[derive(Debug, Clone)]
pub enum GrantScope {
    Registry(Handle<ImageRegistry>),
    Service(Handle<Service>),
    ExecutionRole(Handle<ExecutionRole>),
}

#[derive(Debug, Clone)]
pub struct AccessGrant {
    pub name: String,
    pub principal: Handle<DeployPrincipal>,
    pub scopes: Vec<GrantScope>,
}

macro_rules! declarations {
    ($($entity:ident => $kind:ident),* $(,)?) => {
        /// Every declared entity, as stored by the builder.
        #[derive(Debug, Clone)]
        pub enum Declaration {
            $($entity($entity),)*
        }

        $(
            impl Declared for $entity {
                const KIND: ResourceKind = ResourceKind::$kind;

                fn name(&self) -> &str {
                    &self.name
                }

                fn into_declaration(self) -> Declaration {
                    Declaration::$entity(self)
                }

                fn from_declaration(decl: &Declaration) -> Option<&Self> {
                    match decl {
                        Declaration::$entity(entity) => Some(entity),
                        _ => None,
                    }
                }
            }
        )*
    };
}

declarations! {
    NetworkTopology => Network,
    SecurityGroup => SecurityGroup,
    ImageRegistry => ImageRegistry,
    DeployPrincipal => DeployPrincipal,
    ExecutionRole => ExecutionRole,
    AccessGrant => AccessGrant,
    ComputeCluster => ComputeCluster,
    WorkloadDefinition => WorkloadDefinition,
    Service => Service,
    LoadBalancer => LoadBalancer,
    TargetGroup => TargetGroup,
    Listener => Listener,
}
