//! Config and synthesis services over an in-memory config store.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use stackcraft_cli::application::services::{config_service, stack};
use stackcraft_cli::domain::config::DeployParameters;
use stackcraft_cli::domain::{CompositionError, ConfigError};
use stackcraft_common::{ApplicationProtocol, ResourceKind};

use crate::helpers::CERT;
use crate::mocks::InMemoryConfigStore;

#[test]
fn set_value_persists_the_parsed_value() {
    let store = InMemoryConfigStore::default();
    config_service::set_value(&store, "listener.protocol", "http").unwrap();
    config_service::set_value(&store, "service.desired_count", "1").unwrap();

    let config = config_service::load_config(&store).unwrap();
    assert_eq!(config.listener.protocol, ApplicationProtocol::Http);
    assert_eq!(config.service.desired_count, 1);
}

#[test]
fn rejected_value_leaves_the_store_untouched() {
    let store = InMemoryConfigStore::default();
    let err = config_service::set_value(&store, "network.cidr", "10.0.0.0/33").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidValue { .. })
    ));
    assert!(store.config.borrow().is_none());
}

#[test]
fn none_clears_an_optional_value() {
    let store = InMemoryConfigStore::default();
    config_service::set_value(&store, "cluster.spot_price", "none").unwrap();
    assert!(config_service::load_config(&store).unwrap().cluster.spot_price.is_none());
}

#[test]
fn default_config_needs_a_certificate() {
    let store = InMemoryConfigStore::default();
    let config = stack::resolve_config(&store, &DeployParameters::default()).unwrap();
    let err = stack::synthesize(&config).unwrap_err();
    let composition = err
        .downcast_ref::<CompositionError>()
        .expect("composition error");
    assert_eq!(composition.entity().unwrap().kind, ResourceKind::Listener);
    assert_eq!(composition.field(), Some("certificate"));
}

#[test]
fn certificate_parameter_completes_the_default_stack() {
    let store = InMemoryConfigStore::default();
    let params = DeployParameters {
        certificate: Some(CERT.to_string()),
        ..DeployParameters::default()
    };
    let config = stack::resolve_config(&store, &params).unwrap();
    let graph = stack::synthesize(&config).unwrap();
    assert_eq!(graph.stack, "devops-demo");

    let summary = stack::summarize(&graph).unwrap();
    assert_eq!(summary.resources.len(), graph.len());
    assert_eq!(summary.fingerprint.len(), 64);
    assert_eq!(summary.resources.iter().filter(|r| r.retained).count(), 3);
}

#[test]
fn malformed_target_is_reported_before_composition() {
    let store = InMemoryConfigStore::default();
    let mut config = config_service::load_config(&store).unwrap();
    config.target.region = "mars".to_string();
    let err = stack::synthesize(&config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidTarget(_))
    ));
}
