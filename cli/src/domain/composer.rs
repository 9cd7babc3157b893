//! The stack composer: one parameterized topology for every variant.
//!
//! HTTPS or plain HTTP, internet-facing or internal, spot or on-demand are
//! all configuration, not separate code paths. Declaration order is the
//! creation order handed to the provisioning backend.

use stackcraft_common::{
    DeploymentTarget, PortMapping, ResourceGraph, ResourceKind, TransportProtocol,
};
use tracing::debug;

use crate::domain::config::StackConfig;
use crate::domain::error::{CompositionError, EntityRef};
use crate::domain::topology::{
    AccessGrant, CapacitySpec, ComputeCluster, DeployPrincipal, ExecutionRole, GrantScope,
    ImageRegistry, Ingress, IngressFrom, Listener, LoadBalancer, NetworkTopology, SecurityGroup,
    Service, TargetGroup, TopologyBuilder, WorkloadDefinition,
};

/// Any IPv4 address.
pub const ANYWHERE: &str = "0.0.0.0/0";

/// Compose the full resource graph for `config` into `target`.
///
/// Nothing is returned unless every declaration succeeds.
///
/// # Errors
///
/// Returns the first reference, constraint or grant error encountered.
pub fn compose(
    config: &StackConfig,
    target: DeploymentTarget,
) -> Result<ResourceGraph, CompositionError> {
    let stack = &config.stack.name;
    debug!(stack = %stack, account = %target.account, region = %target.region, "composing stack");
    let mut b = TopologyBuilder::new(stack.clone(), target);

    // ── Network and identity ────────────────────────────────────────────────
    let net = &config.network;
    let network = b.declare_network(NetworkTopology {
        name: stack.clone(),
        cidr: net.cidr.clone(),
        zones: net.zones,
        subnet_mask: net.subnet_mask,
        public_subnets: net.public_subnets,
        private_subnets: net.private_subnets,
    })?;
    let registry = b.declare_image_registry(ImageRegistry {
        name: config.registry.name.clone(),
        scan_on_push: config.registry.scan_on_push,
        immutable_tags: config.registry.immutable_tags,
    })?;
    let principal = b.declare_deploy_principal(DeployPrincipal {
        name: config.identity.deploy_principal.clone(),
    })?;
    let execution_role = b.declare_execution_role(ExecutionRole {
        name: config.identity.execution_role.clone(),
    })?;

    // ── Security groups ─────────────────────────────────────────────────────
    let lb_cfg = &config.load_balancer;
    let listener_port = config.listener.effective_port();
    let lb_source = if lb_cfg.internet_facing {
        ANYWHERE.to_string()
    } else {
        net.cidr.clone()
    };
    let lb_group = b.declare_security_group(SecurityGroup {
        name: format!("{stack}-lb"),
        description: format!("{} listener traffic", config.listener.protocol),
        network: network.clone(),
        ingress: vec![Ingress {
            port: listener_port,
            from: IngressFrom::Cidr(lb_source),
        }],
    })?;
    let wl = &config.workload;
    let instance_group = b.declare_security_group(SecurityGroup {
        name: format!("{stack}-instances"),
        description: "Workload traffic from the load balancer".to_string(),
        network: network.clone(),
        ingress: vec![Ingress {
            port: wl.host_port,
            from: IngressFrom::Group(lb_group.clone()),
        }],
    })?;

    // ── Compute ─────────────────────────────────────────────────────────────
    let cl = &config.cluster;
    b.declare_compute_cluster(ComputeCluster {
        name: cl.name.clone(),
        network: network.clone(),
        security_group: instance_group,
        capacity: CapacitySpec {
            instance_type: cl.instance_type.clone(),
            instance_memory_mib: cl.instance_memory_mib,
            spot_price: cl.spot_price.clone(),
            min: cl.min_capacity,
            desired: cl.desired_capacity,
            max: cl.max_capacity,
        },
    })?;

    let mut port_mappings = vec![PortMapping {
        container_port: wl.container_port,
        host_port: wl.host_port,
        protocol: TransportProtocol::Tcp,
    }];
    port_mappings.extend(wl.extra_ports.iter().copied());
    let workload = b.declare_workload(WorkloadDefinition {
        name: wl.family.clone(),
        execution_role: execution_role.clone(),
        registry: registry.clone(),
        image_tag: wl.image_tag.clone(),
        container_name: wl.container_name.clone(),
        memory_mib: wl.memory_mib,
        network_mode: wl.network_mode,
        port_mappings,
        command: wl.command.clone(),
    })?;

    let svc = &config.service;
    let cluster_name = config.service_cluster();
    let cluster = b.lookup::<ComputeCluster>(cluster_name).ok_or_else(|| {
        CompositionError::reference(
            EntityRef::new(ResourceKind::Service, svc.name.as_str()),
            "cluster",
            ResourceKind::ComputeCluster,
            cluster_name,
        )
    })?;
    let service = b.declare_service(Service {
        name: svc.name.clone(),
        cluster,
        workload,
        desired_count: svc.desired_count,
        placement: svc.placement,
    })?;

    // ── Load balancing ──────────────────────────────────────────────────────
    let tg = &config.target_group;
    b.declare_target_group(TargetGroup {
        name: tg.name.clone(),
        service: service.clone(),
        port: tg.port.unwrap_or(wl.host_port),
        protocol: tg.protocol,
        health_check_path: tg.health_check_path.clone(),
    })?;
    let balancer = b.declare_load_balancer(LoadBalancer {
        name: lb_cfg.name.clone(),
        network,
        security_group: lb_group,
        internet_facing: lb_cfg.internet_facing,
    })?;

    let listener_name = format!(
        "{}-{}",
        lb_cfg.name,
        config.listener.protocol.to_string().to_ascii_lowercase()
    );
    let listener_ref = EntityRef::new(ResourceKind::Listener, listener_name.as_str());
    let target_group_names = config.listener_target_groups();
    if target_group_names.len() != 1 {
        return Err(CompositionError::constraint(
            listener_ref,
            "default_target_group",
            format!(
                "{} default target groups given; a listener routes to exactly one",
                target_group_names.len()
            ),
        ));
    }
    let mut default_target_groups = Vec::new();
    for name in target_group_names {
        let handle = b.lookup::<TargetGroup>(&name).ok_or_else(|| {
            CompositionError::reference(
                listener_ref.clone(),
                "default_target_group",
                ResourceKind::TargetGroup,
                name.as_str(),
            )
        })?;
        default_target_groups.push(handle);
    }
    b.declare_listener(Listener {
        name: listener_name,
        load_balancer: balancer,
        port: listener_port,
        protocol: config.listener.protocol,
        certificate: config.listener.certificate_arn.clone(),
        default_target_groups,
    })?;

    // ── Access grants, composed once every scope exists ────────────────────
    b.declare_access_grant(AccessGrant {
        name: format!("{}-policy", principal.name()),
        principal,
        scopes: vec![
            GrantScope::Registry(registry),
            GrantScope::Service(service),
            GrantScope::ExecutionRole(execution_role),
        ],
    })?;

    b.finish()
}
