//! Compute cluster, workload definition and service declarations.

use std::collections::HashSet;

use stackcraft_common::{
    CapacityProperties, ComputeClusterProperties, ContainerProperties, ImageReference,
    NetworkMode, RemovalPolicy, ResourceProperties, ServiceProperties, SubnetVisibility,
    WorkloadDefinitionProperties,
};

use super::builder::TopologyBuilder;
use super::entity::{CapacitySpec, ComputeCluster, Service, WorkloadDefinition};
use super::handle::{Declared, Handle};
use crate::domain::error::{CompositionError, EntityRef};
use crate::domain::naming::{NameRule, is_valid_image_tag};
use crate::domain::placement::{self, ClusterCapacity, TaskFootprint};

/// Smallest hard memory limit the container agent accepts.
pub const MIN_CONTAINER_MEMORY_MIB: u32 = 6;

impl CapacitySpec {
    /// Memory per instance from the override or the instance type table.
    #[must_use]
    pub fn instance_memory_mib(&self) -> Option<u32> {
        self.instance_memory_mib
            .or_else(|| placement::instance_memory_mib(&self.instance_type))
    }

    fn validate(&self, entity: &EntityRef) -> Result<(), CompositionError> {
        let violation = |field, reason: String| {
            CompositionError::constraint(entity.clone(), field, reason)
        };
        if self.max == 0 {
            return Err(violation("max_capacity", "max capacity must be at least 1".to_string()));
        }
        if self.min > self.desired {
            return Err(violation(
                "desired_capacity",
                format!("desired capacity {} is below min capacity {}", self.desired, self.min),
            ));
        }
        if self.desired > self.max {
            return Err(violation(
                "desired_capacity",
                format!("desired capacity {} exceeds max capacity {}", self.desired, self.max),
            ));
        }
        if let Some(price) = &self.spot_price
            && !price.parse::<f64>().is_ok_and(|p| p.is_finite() && p > 0.0)
        {
            return Err(violation(
                "spot_price",
                format!("'{price}' is not a positive hourly price"),
            ));
        }
        if self.instance_memory_mib() == Some(0) {
            return Err(violation("instance_memory_mib", "must be greater than 0".to_string()));
        }
        if self.instance_memory_mib().is_none() {
            return Err(violation(
                "instance_type",
                format!(
                    "memory of instance type '{}' is unknown; set instance_memory_mib",
                    self.instance_type
                ),
            ));
        }
        Ok(())
    }
}

fn check_name(
    entity: &EntityRef,
    field: &'static str,
    rule: NameRule,
    name: &str,
) -> Result<(), CompositionError> {
    rule.check(name)
        .map_err(|reason| CompositionError::constraint(entity.clone(), field, reason))
}

impl TopologyBuilder {
    /// # Errors
    ///
    /// Rejects unresolved handles, a security group from another network
    /// and capacity specs where min <= desired <= max does not hold.
    pub fn declare_compute_cluster(
        &mut self,
        cluster: ComputeCluster,
    ) -> Result<Handle<ComputeCluster>, CompositionError> {
        let entity = cluster.entity();
        check_name(&entity, "name", NameRule::Resource, &cluster.name)?;
        self.ensure_unique(&cluster)?;
        let network = self.resolve(&entity, "network", &cluster.network)?;
        let subnets = if network.public_subnets {
            SubnetVisibility::Public
        } else {
            SubnetVisibility::Private
        };
        let group = self.resolve(&entity, "security_group", &cluster.security_group)?;
        if group.network != cluster.network {
            return Err(CompositionError::constraint(
                entity,
                "security_group",
                format!(
                    "security group '{}' belongs to network '{}', not '{}'",
                    group.name,
                    group.network.name(),
                    cluster.network.name()
                ),
            ));
        }
        cluster.capacity.validate(&entity)?;

        let capacity = &cluster.capacity;
        let properties = ResourceProperties::ComputeCluster(ComputeClusterProperties {
            name: cluster.name.clone(),
            network: cluster.network.short_id(),
            security_group: cluster.security_group.short_id(),
            subnets,
            capacity: CapacityProperties {
                instance_type: capacity.instance_type.clone(),
                spot_price: capacity.spot_price.clone(),
                min: capacity.min,
                desired: capacity.desired,
                max: capacity.max,
            },
        });
        Ok(self.emit(cluster, RemovalPolicy::Destroy, properties))
    }

    /// # Errors
    ///
    /// Rejects unresolved handles, invalid names or tags, a missing port
    /// mapping and host ports published twice.
    pub fn declare_workload(
        &mut self,
        workload: WorkloadDefinition,
    ) -> Result<Handle<WorkloadDefinition>, CompositionError> {
        let entity = workload.entity();
        check_name(&entity, "name", NameRule::Resource, &workload.name)?;
        check_name(&entity, "container_name", NameRule::Resource, &workload.container_name)?;
        self.ensure_unique(&workload)?;
        self.resolve(&entity, "execution_role", &workload.execution_role)?;
        self.resolve(&entity, "image", &workload.registry)?;

        let violation = |field, reason: String| {
            CompositionError::constraint(entity.clone(), field, reason)
        };
        if !is_valid_image_tag(&workload.image_tag) {
            return Err(violation(
                "image_tag",
                format!("'{}' is not a valid image tag", workload.image_tag),
            ));
        }
        if workload.memory_mib < MIN_CONTAINER_MEMORY_MIB {
            return Err(violation(
                "memory_mib",
                format!(
                    "{} MiB is below the {MIN_CONTAINER_MEMORY_MIB} MiB minimum",
                    workload.memory_mib
                ),
            ));
        }
        if workload.port_mappings.is_empty() {
            return Err(violation(
                "port_mappings",
                "at least one port mapping is required".to_string(),
            ));
        }
        let mut published = HashSet::new();
        for mapping in &workload.port_mappings {
            if mapping.container_port == 0 || mapping.host_port == 0 {
                return Err(violation(
                    "port_mappings",
                    format!(
                        "{}:{} uses port 0",
                        mapping.host_port, mapping.container_port
                    ),
                ));
            }
            if workload.network_mode != NetworkMode::Bridge
                && mapping.host_port != mapping.container_port
            {
                return Err(violation(
                    "port_mappings",
                    format!(
                        "host port {} must equal container port {} outside bridge mode",
                        mapping.host_port, mapping.container_port
                    ),
                ));
            }
            if !published.insert((mapping.host_port, mapping.protocol)) {
                return Err(violation(
                    "port_mappings",
                    format!("host port {} is mapped more than once", mapping.host_port),
                ));
            }
        }

        let properties = ResourceProperties::WorkloadDefinition(WorkloadDefinitionProperties {
            family: workload.name.clone(),
            execution_role: workload.execution_role.arn(),
            network_mode: workload.network_mode,
            container: ContainerProperties {
                name: workload.container_name.clone(),
                image: ImageReference {
                    registry: workload.registry.arn(),
                    tag: workload.image_tag.clone(),
                },
                memory_mib: workload.memory_mib,
                port_mappings: workload.port_mappings.clone(),
                command: workload.command.clone(),
            },
        });
        Ok(self.emit(workload, RemovalPolicy::Destroy, properties))
    }

    /// Declare the service and apply the placement policy.
    ///
    /// # Errors
    ///
    /// Rejects unresolved handles and desired counts the cluster cannot
    /// host at its desired size.
    pub fn declare_service(
        &mut self,
        service: Service,
    ) -> Result<Handle<Service>, CompositionError> {
        let entity = service.entity();
        check_name(&entity, "name", NameRule::Resource, &service.name)?;
        self.ensure_unique(&service)?;
        let cluster = self.resolve(&entity, "cluster", &service.cluster)?;
        let workload = self.resolve(&entity, "workload", &service.workload)?;

        let Some(instance_memory) = cluster.capacity.instance_memory_mib() else {
            return Err(CompositionError::constraint(
                entity,
                "cluster",
                format!("cluster '{}' has no known instance memory", cluster.name),
            ));
        };
        let capacity = ClusterCapacity::new(
            cluster.capacity.desired,
            instance_memory,
            TaskFootprint {
                memory_mib: workload.memory_mib,
                network_mode: workload.network_mode,
            },
        );
        placement::check_capacity(service.desired_count, service.placement, capacity)
            .map_err(|reason| {
                CompositionError::constraint(entity.clone(), "desired_count", reason)
            })?;

        let properties = ResourceProperties::Service(ServiceProperties {
            name: service.name.clone(),
            cluster: service.cluster.arn(),
            workload: service.workload.arn(),
            desired_count: service.desired_count,
            placement: service.placement,
        });
        Ok(self.emit(service, RemovalPolicy::Destroy, properties))
    }
}
