//! Load balancer, target group and listener declarations.

use stackcraft_common::{
    ListenerProperties, LoadBalancerProperties, NetworkMode, RemovalPolicy, ResourceProperties,
    SubnetVisibility, TargetGroupProperties, TargetType,
};

use super::builder::TopologyBuilder;
use super::entity::{Listener, LoadBalancer, NetworkTopology, TargetGroup};
use super::handle::{Declared, Handle};
use crate::domain::error::{CompositionError, EntityRef};
use crate::domain::listener;
use crate::domain::naming::NameRule;

/// Load balancers must span at least this many zones.
pub const MIN_BALANCER_ZONES: u8 = 2;

impl TopologyBuilder {
    /// Network the target group's service runs in.
    fn target_group_network(
        &self,
        owner: &EntityRef,
        group: &TargetGroup,
    ) -> Result<Handle<NetworkTopology>, CompositionError> {
        let service = self.resolve(owner, "service", &group.service)?;
        let cluster = self.resolve(owner, "service", &service.cluster)?;
        Ok(cluster.network.clone())
    }

    /// # Errors
    ///
    /// Rejects an internet-facing balancer on a network without public
    /// subnets and networks spanning fewer than two zones.
    pub fn declare_load_balancer(
        &mut self,
        balancer: LoadBalancer,
    ) -> Result<Handle<LoadBalancer>, CompositionError> {
        let entity = balancer.entity();
        NameRule::LoadBalancing
            .check(&balancer.name)
            .map_err(|reason| CompositionError::constraint(entity.clone(), "name", reason))?;
        self.ensure_unique(&balancer)?;
        let network = self.resolve(&entity, "network", &balancer.network)?;

        if balancer.internet_facing && !network.public_subnets {
            return Err(CompositionError::constraint(
                entity,
                "network",
                format!(
                    "internet-facing load balancer needs public subnets; network '{}' has none",
                    network.name
                ),
            ));
        }
        if network.zones < MIN_BALANCER_ZONES {
            return Err(CompositionError::constraint(
                entity,
                "network",
                format!(
                    "load balancers need subnets in at least {MIN_BALANCER_ZONES} zones; \
                     network '{}' spans {}",
                    network.name, network.zones
                ),
            ));
        }
        let subnets = if balancer.internet_facing || !network.private_subnets {
            SubnetVisibility::Public
        } else {
            SubnetVisibility::Private
        };

        let group = self.resolve(&entity, "security_group", &balancer.security_group)?;
        if group.network != balancer.network {
            return Err(CompositionError::constraint(
                entity,
                "security_group",
                format!(
                    "security group '{}' belongs to network '{}', not '{}'",
                    group.name,
                    group.network.name(),
                    balancer.network.name()
                ),
            ));
        }

        let properties = ResourceProperties::LoadBalancer(LoadBalancerProperties {
            name: balancer.name.clone(),
            network: balancer.network.short_id(),
            security_group: balancer.security_group.short_id(),
            internet_facing: balancer.internet_facing,
            subnets,
        });
        Ok(self.emit(balancer, RemovalPolicy::Destroy, properties))
    }

    /// Bind a target group to the service's load-balanced port.
    ///
    /// # Errors
    ///
    /// Rejects a bound port that differs from the host port of the
    /// workload's first port mapping.
    pub fn declare_target_group(
        &mut self,
        group: TargetGroup,
    ) -> Result<Handle<TargetGroup>, CompositionError> {
        let entity = group.entity();
        NameRule::LoadBalancing
            .check(&group.name)
            .map_err(|reason| CompositionError::constraint(entity.clone(), "name", reason))?;
        self.ensure_unique(&group)?;

        let service = self.resolve(&entity, "service", &group.service)?;
        let workload = self.resolve(&entity, "service", &service.workload)?;
        let Some(primary) = workload.primary_port().copied() else {
            return Err(CompositionError::constraint(
                entity,
                "port",
                format!("workload '{}' publishes no ports", workload.name),
            ));
        };
        if group.port != primary.host_port {
            return Err(CompositionError::constraint(
                entity,
                "port",
                format!(
                    "bound port {} does not match host port {} of workload '{}' (container port {})",
                    group.port, primary.host_port, workload.name, primary.container_port
                ),
            ));
        }
        if !group.health_check_path.starts_with('/') {
            return Err(CompositionError::constraint(
                entity,
                "health_check_path",
                format!("'{}' must start with '/'", group.health_check_path),
            ));
        }
        let target_type = if workload.network_mode == NetworkMode::Awsvpc {
            TargetType::Ip
        } else {
            TargetType::Instance
        };
        let container_name = workload.container_name.clone();
        let network = self.target_group_network(&entity, &group)?;

        let properties = ResourceProperties::TargetGroup(TargetGroupProperties {
            name: group.name.clone(),
            network: network.short_id(),
            service: group.service.arn(),
            container_name,
            target_type,
            port: group.port,
            protocol: group.protocol,
            health_check_path: group.health_check_path.clone(),
        });
        Ok(self.emit(group, RemovalPolicy::Destroy, properties))
    }

    /// Attach the load balancer's only listener.
    ///
    /// # Errors
    ///
    /// Rejects a second listener on the same balancer, anything but one
    /// default target group, a protocol/certificate mismatch and target
    /// groups on another network.
    pub fn declare_listener(
        &mut self,
        listener: Listener,
    ) -> Result<Handle<Listener>, CompositionError> {
        let entity = listener.entity();
        NameRule::Resource
            .check(&listener.name)
            .map_err(|reason| CompositionError::constraint(entity.clone(), "name", reason))?;
        self.ensure_unique(&listener)?;
        let balancer = self.resolve(&entity, "load_balancer", &listener.load_balancer)?;
        let balancer_network = balancer.network.clone();

        if let Some((existing, _)) = self
            .declared::<Listener>()
            .find(|(_, l)| l.load_balancer == listener.load_balancer)
        {
            return Err(CompositionError::constraint(
                entity,
                "load_balancer",
                format!(
                    "load balancer '{}' already has listener '{}'",
                    listener.load_balancer.name(),
                    existing.name()
                ),
            ));
        }
        if listener.port == 0 {
            return Err(CompositionError::constraint(entity, "port", "port 0 cannot be bound"));
        }

        for target in &listener.default_target_groups {
            self.resolve(&entity, "default_target_group", target)?;
        }
        let certificate = listener::bind(
            listener.protocol,
            listener.certificate.as_deref(),
            listener.default_target_groups.len(),
        )
        .map_err(|(field, reason)| CompositionError::constraint(entity.clone(), field, reason))?;

        let Some(default) = listener.default_target_groups.first().cloned() else {
            return Err(CompositionError::constraint(
                entity,
                "default_target_group",
                "a listener needs one default target group",
            ));
        };
        let group = self.resolve(&entity, "default_target_group", &default)?;
        let group_network = self.target_group_network(&entity, group)?;
        if group_network != balancer_network {
            return Err(CompositionError::constraint(
                entity,
                "default_target_group",
                format!(
                    "target group '{}' routes into network '{}' but the load balancer is in '{}'",
                    default.name(),
                    group_network.name(),
                    balancer_network.name()
                ),
            ));
        }

        let properties = ResourceProperties::Listener(ListenerProperties {
            load_balancer: listener.load_balancer.arn(),
            port: listener.port,
            protocol: listener.protocol,
            certificate,
            default_target_group: default.arn(),
        });
        Ok(self.emit(listener, RemovalPolicy::Destroy, properties))
    }
}
