//! Domain types and validators for the stack configuration bundle.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use stackcraft_common::{
    ApplicationProtocol, DeploymentTarget, NetworkMode, PlacementStrategy, PortMapping,
};

use crate::domain::error::ConfigError;
use crate::domain::naming::{ACCOUNT_RE, REGION_RE};

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "stack.name",
    "target.account",
    "target.region",
    "network.cidr",
    "network.zones",
    "cluster.instance_type",
    "cluster.spot_price",
    "cluster.min_capacity",
    "cluster.desired_capacity",
    "cluster.max_capacity",
    "workload.image_tag",
    "workload.memory_mib",
    "service.desired_count",
    "service.placement",
    "listener.protocol",
    "listener.certificate_arn",
    "load_balancer.internet_facing",
];

/// Placeholder account used when no deployment target is configured.
pub const DEFAULT_ACCOUNT: &str = "000000000000";
pub const DEFAULT_REGION: &str = "us-east-1";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `stackcraft.yaml`.
///
/// Every section is optional; omitted fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StackConfig {
    pub stack: StackSection,
    pub target: TargetConfig,
    pub network: NetworkConfig,
    pub registry: RegistryConfig,
    pub identity: IdentityConfig,
    pub cluster: ClusterConfig,
    pub workload: WorkloadConfig,
    pub service: ServiceConfig,
    pub load_balancer: LoadBalancerConfig,
    pub target_group: TargetGroupConfig,
    pub listener: ListenerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StackSection {
    pub name: String,
}

impl Default for StackSection {
    fn default() -> Self {
        Self {
            name: "devops-demo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TargetConfig {
    pub account: String,
    pub region: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT.to_string(),
            region: DEFAULT_REGION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    pub cidr: String,
    /// Number of availability zones to spread subnets across.
    pub zones: u8,
    /// Prefix length of each carved subnet.
    pub subnet_mask: u8,
    pub public_subnets: bool,
    pub private_subnets: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cidr: "10.0.0.0/16".to_string(),
            zones: 3,
            subnet_mask: 24,
            public_subnets: true,
            private_subnets: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    pub name: String,
    pub scan_on_push: bool,
    pub immutable_tags: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "devops-demo".to_string(),
            scan_on_push: true,
            immutable_tags: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IdentityConfig {
    pub deploy_principal: String,
    pub execution_role: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            deploy_principal: "devops-demo-deployer".to_string(),
            execution_role: "devops-demo-task-execution".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    pub name: String,
    pub instance_type: String,
    /// Memory available to tasks per instance; required for instance types
    /// the placement table does not know.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_memory_mib: Option<u32>,
    /// Spot bid ceiling in USD/hour; omit for on-demand capacity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spot_price: Option<String>,
    pub min_capacity: u32,
    pub desired_capacity: u32,
    pub max_capacity: u32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: "devops-demo".to_string(),
            instance_type: "t2.micro".to_string(),
            instance_memory_mib: None,
            spot_price: Some("0.0116".to_string()),
            min_capacity: 1,
            desired_capacity: 2,
            max_capacity: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkloadConfig {
    pub family: String,
    pub container_name: String,
    pub image_tag: String,
    pub memory_mib: u32,
    pub network_mode: NetworkMode,
    /// Port the load balancer routes to inside the container.
    pub container_port: u16,
    /// Port published on the instance for `container_port`.
    pub host_port: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_ports: Vec<PortMapping>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            family: "web".to_string(),
            container_name: "web".to_string(),
            image_tag: "latest".to_string(),
            memory_mib: 512,
            network_mode: NetworkMode::Bridge,
            container_port: 80,
            host_port: 3000,
            extra_ports: Vec::new(),
            command: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    /// Cluster the service runs on; defaults to `cluster.name`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    pub desired_count: u32,
    pub placement: PlacementStrategy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "web".to_string(),
            cluster: None,
            desired_count: 2,
            placement: PlacementStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoadBalancerConfig {
    pub name: String,
    pub internet_facing: bool,
}

impl Default for LoadBalancerConfig {
    fn default() -> Self {
        Self {
            name: "devops-demo-lb".to_string(),
            internet_facing: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TargetGroupConfig {
    pub name: String,
    /// Bound port; defaults to `workload.host_port` and must equal it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub protocol: ApplicationProtocol,
    pub health_check_path: String,
}

impl Default for TargetGroupConfig {
    fn default() -> Self {
        Self {
            name: "devops-demo-tg".to_string(),
            port: None,
            protocol: ApplicationProtocol::Http,
            health_check_path: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    pub protocol: ApplicationProtocol,
    /// Defaults to 443 for HTTPS and 80 for HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<String>,
    /// Names of default target groups; defaults to `[target_group.name]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_target_groups: Option<Vec<String>>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            protocol: ApplicationProtocol::Https,
            port: None,
            certificate_arn: None,
            default_target_groups: None,
        }
    }
}

impl ListenerConfig {
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(match self.protocol {
            ApplicationProtocol::Https => 443,
            ApplicationProtocol::Http => 80,
        })
    }
}

// ── Deploy-time parameters ───────────────────────────────────────────────────

/// Values supplied at graph-build time that override the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployParameters {
    pub certificate: Option<String>,
    pub image_tag: Option<String>,
    pub desired_count: Option<u32>,
    pub account: Option<String>,
    pub region: Option<String>,
}

impl StackConfig {
    /// Apply deploy-time overrides on top of the file configuration.
    #[must_use]
    pub fn with_parameters(mut self, params: &DeployParameters) -> Self {
        if let Some(cert) = &params.certificate {
            self.listener.certificate_arn = Some(cert.clone());
        }
        if let Some(tag) = &params.image_tag {
            self.workload.image_tag.clone_from(tag);
        }
        if let Some(count) = params.desired_count {
            self.service.desired_count = count;
        }
        if let Some(account) = &params.account {
            self.target.account.clone_from(account);
        }
        if let Some(region) = &params.region {
            self.target.region.clone_from(region);
        }
        self
    }

    /// The cluster name the service is placed on.
    #[must_use]
    pub fn service_cluster(&self) -> &str {
        self.service.cluster.as_deref().unwrap_or(&self.cluster.name)
    }

    /// Names of the listener's default target groups.
    #[must_use]
    pub fn listener_target_groups(&self) -> Vec<String> {
        self.listener
            .default_target_groups
            .clone()
            .unwrap_or_else(|| vec![self.target_group.name.clone()])
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates the deployment target and converts it to its wire form.
///
/// # Errors
///
/// Returns an error if the account or region is malformed.
pub fn validate_target(target: &TargetConfig) -> Result<DeploymentTarget, ConfigError> {
    if !ACCOUNT_RE.is_match(&target.account) {
        return Err(ConfigError::InvalidTarget(format!(
            "account '{}' must be 12 digits",
            target.account
        )));
    }
    if !REGION_RE.is_match(&target.region) {
        return Err(ConfigError::InvalidTarget(format!(
            "region '{}' is not a region code like us-east-1",
            target.region
        )));
    }
    Ok(DeploymentTarget {
        account: target.account.clone(),
        region: target.region.clone(),
    })
}

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

fn invalid(key: &str, value: &str, expected: &str) -> anyhow::Error {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
    .into()
}

fn parse_u32(key: &str, value: &str) -> Result<u32> {
    value
        .parse()
        .map_err(|_| invalid(key, value, "a non-negative integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "yes" => Ok(true),
        "false" | "no" => Ok(false),
        _ => Err(invalid(key, value, "true or false")),
    }
}

fn parse_protocol(key: &str, value: &str) -> Result<ApplicationProtocol> {
    match value.to_ascii_uppercase().as_str() {
        "HTTPS" => Ok(ApplicationProtocol::Https),
        "HTTP" => Ok(ApplicationProtocol::Http),
        _ => Err(invalid(key, value, "HTTP or HTTPS")),
    }
}

/// Optional values are cleared with `none`.
fn parse_optional(value: &str) -> Option<String> {
    if value == "none" || value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let mut scratch = StackConfig::default();
    apply_config_value(&mut scratch, key, value)
}

/// Parse `value` for `key` and store it in `config`.
///
/// # Errors
///
/// Returns an error if the key is unknown or the value does not parse.
pub fn apply_config_value(config: &mut StackConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    match key {
        "stack.name" => {
            if value.is_empty() {
                return Err(invalid(key, value, "a non-empty name"));
            }
            config.stack.name = value.to_string();
        }
        "target.account" => {
            if !ACCOUNT_RE.is_match(value) {
                return Err(invalid(key, value, "a 12-digit account id"));
            }
            config.target.account = value.to_string();
        }
        "target.region" => {
            if !REGION_RE.is_match(value) {
                return Err(invalid(key, value, "a region code like us-east-1"));
            }
            config.target.region = value.to_string();
        }
        "network.cidr" => {
            if value.parse::<crate::domain::cidr::Ipv4Cidr>().is_err() {
                return Err(invalid(key, value, "an IPv4 CIDR block like 10.0.0.0/16"));
            }
            config.network.cidr = value.to_string();
        }
        "network.zones" => {
            config.network.zones = value
                .parse()
                .map_err(|_| invalid(key, value, "a zone count between 1 and 6"))?;
        }
        "cluster.instance_type" => {
            if value.is_empty() {
                return Err(invalid(key, value, "an instance type like t3.micro"));
            }
            config.cluster.instance_type = value.to_string();
        }
        "cluster.spot_price" => {
            let price = parse_optional(value);
            if let Some(p) = &price
                && !p.parse::<f64>().is_ok_and(|v| v > 0.0)
            {
                return Err(invalid(key, value, "a positive USD price or none"));
            }
            config.cluster.spot_price = price;
        }
        "cluster.min_capacity" => config.cluster.min_capacity = parse_u32(key, value)?,
        "cluster.desired_capacity" => config.cluster.desired_capacity = parse_u32(key, value)?,
        "cluster.max_capacity" => config.cluster.max_capacity = parse_u32(key, value)?,
        "workload.image_tag" => {
            if !crate::domain::naming::is_valid_image_tag(value) {
                return Err(invalid(key, value, "an image tag like latest or v1.2.3"));
            }
            config.workload.image_tag = value.to_string();
        }
        "workload.memory_mib" => config.workload.memory_mib = parse_u32(key, value)?,
        "service.desired_count" => config.service.desired_count = parse_u32(key, value)?,
        "service.placement" => {
            config.service.placement = value.parse().map_err(|_| {
                invalid(
                    key,
                    value,
                    "spread-instance, spread-zone, binpack-memory, binpack-cpu or random",
                )
            })?;
        }
        "listener.protocol" => config.listener.protocol = parse_protocol(key, value)?,
        "listener.certificate_arn" => config.listener.certificate_arn = parse_optional(value),
        "load_balancer.internet_facing" => {
            config.load_balancer.internet_facing = parse_bool(key, value)?;
        }
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
