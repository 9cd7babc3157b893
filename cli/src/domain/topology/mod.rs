//! Typed topology declarations.
//!
//! Entities are declared through [`TopologyBuilder`], which hands back a
//! [`Handle`] for each one. Later declarations take those handles instead
//! of names, so a dangling reference cannot be written down.

mod builder;
mod compute;
mod entity;
mod handle;
mod identity;
mod load_balancing;
mod network;

pub use builder::TopologyBuilder;
pub use compute::MIN_CONTAINER_MEMORY_MIB;
pub use entity::{
    AccessGrant, CapacitySpec, ComputeCluster, Declaration, DeployPrincipal, ExecutionRole,
    GrantScope, ImageRegistry, Ingress, IngressFrom, Listener, LoadBalancer, NetworkTopology,
    SecurityGroup, Service, TargetGroup, WorkloadDefinition,
};
pub use handle::{Declared, GraphId, Handle};
pub use identity::TASK_EXECUTION_POLICY;
pub use load_balancing::MIN_BALANCER_ZONES;
pub use network::{MAX_NETWORK_PREFIX, MAX_ZONES, MIN_NETWORK_PREFIX};
