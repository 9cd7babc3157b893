//! Property-based tests for composition invariants.
//!
//! Uses `proptest` to verify invariants across many random configurations.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;

use stackcraft_cli::domain::config::{VALID_CONFIG_KEYS, validate_config_key};
use stackcraft_cli::domain::graph_fingerprint;
use stackcraft_cli::domain::placement::{ClusterCapacity, TaskFootprint, check_capacity};
use stackcraft_common::{
    NetworkMode, PlacementStrategy, ResourceKind, ResourceProperties,
};

use crate::helpers::{https_config, try_compose};

fn network_mode() -> impl Strategy<Value = NetworkMode> {
    prop_oneof![
        Just(NetworkMode::Bridge),
        Just(NetworkMode::Host),
        Just(NetworkMode::Awsvpc),
    ]
}

fn placement() -> impl Strategy<Value = PlacementStrategy> {
    prop_oneof![
        Just("spread-instance"),
        Just("spread-zone"),
        Just("binpack-memory"),
        Just("binpack-cpu"),
        Just("random"),
    ]
    .prop_map(|s| s.parse().unwrap())
}

// ============================================================================
// Determinism
// ============================================================================

proptest! {
    /// Composing the same configuration twice yields the same fingerprint.
    #[test]
    fn prop_composition_is_deterministic(
        zones in 2u8..=6,
        desired in 1u32..=4,
        tag in "[a-z0-9]{1,12}",
    ) {
        let mut config = https_config();
        config.network.zones = zones;
        config.cluster.desired_capacity = desired;
        config.cluster.max_capacity = desired;
        config.service.desired_count = 1;
        config.workload.image_tag = tag;

        let first = try_compose(&config);
        let second = try_compose(&config);
        prop_assert_eq!(&first, &second);
        if let (Ok(a), Ok(b)) = (first, second) {
            prop_assert_eq!(graph_fingerprint(&a).unwrap(), graph_fingerprint(&b).unwrap());
        }
    }
}

// ============================================================================
// Placement
// ============================================================================

proptest! {
    /// Bridge and host mode never place two tasks on one instance.
    #[test]
    fn prop_fixed_host_port_modes_cap_at_one_task_per_instance(
        instances in 0u32..20,
        memory in 512u32..32768,
        task_memory in 6u32..1024,
        host_mode in proptest::bool::ANY,
    ) {
        let mode = if host_mode { NetworkMode::Host } else { NetworkMode::Bridge };
        let cap = ClusterCapacity::new(instances, memory, TaskFootprint {
            memory_mib: task_memory,
            network_mode: mode,
        });
        prop_assert!(cap.tasks_per_instance <= 1);
        prop_assert!(cap.total() <= instances);
    }

    /// A desired count is accepted exactly when it fits the capacity.
    #[test]
    fn prop_capacity_check_matches_total(
        instances in 1u32..10,
        memory in 512u32..8192,
        task_memory in 6u32..2048,
        desired in 0u32..64,
        mode in network_mode(),
        strategy in placement(),
    ) {
        let cap = ClusterCapacity::new(instances, memory, TaskFootprint {
            memory_mib: task_memory,
            network_mode: mode,
        });
        let accepted = check_capacity(desired, strategy, cap).is_ok();
        let fits = desired <= cap.total() && (desired == 0 || cap.tasks_per_instance > 0);
        prop_assert_eq!(accepted, fits);
    }

    /// The composed service never asks for more tasks than the cluster holds.
    #[test]
    fn prop_composed_services_fit_their_cluster(
        desired_capacity in 1u32..=4,
        desired_count in 0u32..=8,
    ) {
        let mut config = https_config();
        config.cluster.min_capacity = 1;
        config.cluster.desired_capacity = desired_capacity;
        config.cluster.max_capacity = 4;
        config.service.desired_count = desired_count;

        match try_compose(&config) {
            Ok(_) => prop_assert!(desired_count <= desired_capacity),
            Err(err) => {
                prop_assert!(desired_count > desired_capacity);
                prop_assert_eq!(err.field(), Some("desired_count"));
            }
        }
    }
}

// ============================================================================
// Port binding
// ============================================================================

proptest! {
    /// The target group always binds the workload's host port.
    #[test]
    fn prop_target_group_binds_host_port(
        container_port in 1u16..=65535,
        host_port in 1u16..=65535,
    ) {
        let mut config = https_config();
        config.workload.container_port = container_port;
        config.workload.host_port = host_port;

        let graph = try_compose(&config).unwrap();
        let tg = graph.of_kind(ResourceKind::TargetGroup).next().unwrap();
        let ResourceProperties::TargetGroup(props) = &tg.properties else {
            panic!("wrong kind");
        };
        prop_assert_eq!(props.port, host_port);
    }

    /// Any explicit target group port other than the host port is rejected.
    #[test]
    fn prop_mismatched_target_group_port_is_rejected(
        host_port in 1u16..=65535,
        bound in 1u16..=65535,
    ) {
        prop_assume!(host_port != bound);
        let mut config = https_config();
        config.workload.host_port = host_port;
        config.target_group.port = Some(bound);

        let err = try_compose(&config).unwrap_err();
        prop_assert_eq!(err.field(), Some("port"));
    }
}

// ============================================================================
// validate_config_key() property tests
// ============================================================================

proptest! {
    /// Arbitrary keys (not in whitelist) are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z]{1,20}\\.[a-z_]{1,20}") {
        if !VALID_CONFIG_KEYS.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }
}
