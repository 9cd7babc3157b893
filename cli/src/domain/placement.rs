//! Service placement policy: how many tasks the cluster can host.
//!
//! Capacity is checked at composition time against the cluster's desired
//! instance count, so a shortfall is reported before anything is deployed.

use stackcraft_common::{NetworkMode, PlacementStrategy};

/// Memory available to tasks per instance type, in MiB.
pub const INSTANCE_MEMORY_MIB: &[(&str, u32)] = &[
    ("t2.nano", 512),
    ("t2.micro", 1024),
    ("t2.small", 2048),
    ("t2.medium", 4096),
    ("t2.large", 8192),
    ("t2.xlarge", 16384),
    ("t3.nano", 512),
    ("t3.micro", 1024),
    ("t3.small", 2048),
    ("t3.medium", 4096),
    ("t3.large", 8192),
    ("t3.xlarge", 16384),
    ("m5.large", 8192),
    ("m5.xlarge", 16384),
    ("c5.large", 4096),
    ("c5.xlarge", 8192),
    ("r5.large", 16384),
    ("r5.xlarge", 32768),
];

#[must_use]
pub fn instance_memory_mib(instance_type: &str) -> Option<u32> {
    INSTANCE_MEMORY_MIB
        .iter()
        .find(|(name, _)| *name == instance_type)
        .map(|(_, mib)| *mib)
}

/// What one task needs from an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFootprint {
    pub memory_mib: u32,
    pub network_mode: NetworkMode,
}

/// Task capacity of a cluster at its desired size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterCapacity {
    pub instances: u32,
    pub tasks_per_instance: u32,
}

impl ClusterCapacity {
    /// Capacity of `instances` instances with `instance_memory_mib` each.
    ///
    /// Bridge and host mode publish a fixed host port, so at most one task
    /// fits per instance regardless of memory.
    #[must_use]
    pub fn new(instances: u32, instance_memory_mib: u32, task: TaskFootprint) -> Self {
        let by_memory = if task.memory_mib == 0 {
            0
        } else {
            instance_memory_mib / task.memory_mib
        };
        let tasks_per_instance = match task.network_mode {
            NetworkMode::Bridge | NetworkMode::Host => by_memory.min(1),
            NetworkMode::Awsvpc => by_memory,
        };
        Self {
            instances,
            tasks_per_instance,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.instances.saturating_mul(self.tasks_per_instance)
    }
}

/// Check `desired_count` tasks fit under `strategy`.
///
/// # Errors
///
/// Returns a description of the shortfall.
pub fn check_capacity(
    desired_count: u32,
    strategy: PlacementStrategy,
    capacity: ClusterCapacity,
) -> Result<(), String> {
    if capacity.tasks_per_instance == 0 && desired_count > 0 {
        return Err(format!(
            "no instance can host a single task; placement strategy {strategy} has nowhere to put {desired_count}"
        ));
    }
    if desired_count > capacity.total() {
        return Err(format!(
            "desired count {desired_count} exceeds cluster capacity of {} ({} instances x {} tasks each)",
            capacity.total(),
            capacity.instances,
            capacity.tasks_per_instance
        ));
    }
    Ok(())
}
