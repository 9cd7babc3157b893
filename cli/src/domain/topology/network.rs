//! Network topology and security group declarations.

use stackcraft_common::{
    IngressRule, IngressSource, NetworkProperties, RemovalPolicy, ResourceProperties,
    SecurityGroupProperties, SubnetProperties, SubnetVisibility, TransportProtocol,
};

use super::builder::TopologyBuilder;
use super::entity::{IngressFrom, NetworkTopology, SecurityGroup};
use super::handle::{Declared, Handle};
use crate::domain::cidr::{CidrError, Ipv4Cidr};
use crate::domain::error::CompositionError;
use crate::domain::naming::NameRule;

pub const MIN_NETWORK_PREFIX: u8 = 16;
pub const MAX_NETWORK_PREFIX: u8 = 28;
pub const MAX_ZONES: u8 = 6;

impl NetworkTopology {
    /// Visibilities with subnets, public first.
    #[must_use]
    pub fn visibilities(&self) -> Vec<SubnetVisibility> {
        let mut out = Vec::with_capacity(2);
        if self.public_subnets {
            out.push(SubnetVisibility::Public);
        }
        if self.private_subnets {
            out.push(SubnetVisibility::Private);
        }
        out
    }
}

impl TopologyBuilder {
    /// Declare the network and carve one subnet per zone per visibility.
    ///
    /// # Errors
    ///
    /// Rejects malformed or reserved CIDR blocks, zone counts outside 1-6
    /// and subnet layouts that do not fit the block.
    pub fn declare_network(
        &mut self,
        network: NetworkTopology,
    ) -> Result<Handle<NetworkTopology>, CompositionError> {
        let entity = network.entity();
        let violation = |field, reason: String| {
            CompositionError::constraint(entity.clone(), field, reason)
        };

        NameRule::Resource
            .check(&network.name)
            .map_err(|reason| violation("name", reason))?;
        self.ensure_unique(&network)?;

        let block: Ipv4Cidr = network
            .cidr
            .parse()
            .map_err(|e: CidrError| violation("cidr", e.to_string()))?;
        if !(MIN_NETWORK_PREFIX..=MAX_NETWORK_PREFIX).contains(&block.prefix()) {
            return Err(violation(
                "cidr",
                format!(
                    "prefix /{} is outside /{MIN_NETWORK_PREFIX}-/{MAX_NETWORK_PREFIX}",
                    block.prefix()
                ),
            ));
        }
        if let Some((range, label)) = block.reserved_overlap() {
            return Err(violation(
                "cidr",
                format!("{block} overlaps reserved range {range} ({label})"),
            ));
        }
        if !(1..=MAX_ZONES).contains(&network.zones) {
            return Err(violation(
                "zones",
                format!(
                    "{} zones requested; between 1 and {MAX_ZONES} are supported",
                    network.zones
                ),
            ));
        }

        let visibilities = network.visibilities();
        if visibilities.is_empty() {
            return Err(violation(
                "subnets",
                "at least one of public or private subnets must be enabled".to_string(),
            ));
        }
        if network.subnet_mask > MAX_NETWORK_PREFIX {
            return Err(violation(
                "subnet_mask",
                format!(
                    "/{} subnets are smaller than the /{MAX_NETWORK_PREFIX} minimum",
                    network.subnet_mask
                ),
            ));
        }
        let per_zone = usize::from(network.zones);
        let carved = block
            .carve(network.subnet_mask, per_zone * visibilities.len())
            .map_err(|e| violation("subnet_mask", e.to_string()))?;

        let subnets = visibilities
            .iter()
            .flat_map(|v| (0..network.zones).map(move |zone| (zone, *v)))
            .zip(carved)
            .map(|((zone, visibility), cidr)| SubnetProperties {
                zone,
                cidr: cidr.to_string(),
                visibility,
            })
            .collect();

        let properties = ResourceProperties::Network(NetworkProperties {
            cidr: block.to_string(),
            zones: network.zones,
            subnets,
        });
        Ok(self.emit(network, RemovalPolicy::Destroy, properties))
    }

    /// # Errors
    ///
    /// Rejects unresolved handles, malformed CIDR sources and group sources
    /// from another network.
    pub fn declare_security_group(
        &mut self,
        group: SecurityGroup,
    ) -> Result<Handle<SecurityGroup>, CompositionError> {
        let entity = group.entity();
        self.ensure_unique(&group)?;
        self.resolve(&entity, "network", &group.network)?;

        let mut ingress = Vec::with_capacity(group.ingress.len());
        for rule in &group.ingress {
            if rule.port == 0 {
                return Err(CompositionError::constraint(
                    entity,
                    "ingress",
                    "port 0 cannot be opened",
                ));
            }
            let source = match &rule.from {
                IngressFrom::Cidr(cidr) => {
                    let block: Ipv4Cidr = cidr.parse().map_err(
                        |e: CidrError| {
                            CompositionError::constraint(entity.clone(), "ingress", e.to_string())
                        },
                    )?;
                    IngressSource::Cidr(block.to_string())
                }
                IngressFrom::Group(source) => {
                    let peer = self.resolve(&entity, "ingress", source)?;
                    if peer.network != group.network {
                        return Err(CompositionError::constraint(
                            entity,
                            "ingress",
                            format!(
                                "source group '{}' belongs to network '{}', not '{}'",
                                peer.name,
                                peer.network.name(),
                                group.network.name()
                            ),
                        ));
                    }
                    IngressSource::Group(source.short_id())
                }
            };
            ingress.push(IngressRule {
                protocol: TransportProtocol::Tcp,
                port: rule.port,
                source,
            });
        }

        let properties = ResourceProperties::SecurityGroup(SecurityGroupProperties {
            description: group.description.clone(),
            network: group.network.short_id(),
            ingress,
        });
        Ok(self.emit(group, RemovalPolicy::Destroy, properties))
    }
}
