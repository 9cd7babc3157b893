//! Shared fixtures for unit tests.

#![allow(clippy::expect_used)]

use stackcraft_cli::domain::config::StackConfig;
use stackcraft_cli::domain::{CompositionError, compose, validate_target};
use stackcraft_common::{ApplicationProtocol, ResourceGraph};

pub const CERT: &str =
    "arn:aws:acm:us-east-1:123456789012:certificate/2f0c1c9e-5c0a-4a55-9d7b-000000000001";

/// The reference stack: HTTPS listener on 443, bridge-mode workload mapping
/// container port 80 to host port 3000, two spot instances.
pub fn https_config() -> StackConfig {
    let mut config = StackConfig::default();
    config.target.account = "123456789012".to_string();
    config.cluster.min_capacity = 2;
    config.listener.protocol = ApplicationProtocol::Https;
    config.listener.certificate_arn = Some(CERT.to_string());
    config
}

pub fn http_config() -> StackConfig {
    let mut config = https_config();
    config.listener.protocol = ApplicationProtocol::Http;
    config.listener.certificate_arn = None;
    config
}

pub fn try_compose(config: &StackConfig) -> Result<ResourceGraph, CompositionError> {
    let target = validate_target(&config.target).expect("valid target");
    compose(config, target)
}

pub fn compose_ok(config: &StackConfig) -> ResourceGraph {
    try_compose(config).expect("composition should succeed")
}
