//! Domain layer: pure composition logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! `std::net` is used only for `Ipv4Addr` arithmetic.
//! All functions are synchronous and take data in, returning data out.

pub mod cidr;
pub mod composer;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod grants;
pub mod listener;
pub mod naming;
pub mod placement;
pub mod topology;

pub use composer::compose;
pub use config::{
    DeployParameters, StackConfig, apply_config_value, validate_config_key,
    validate_config_value, validate_target,
};
pub use error::{CompositionError, ConfigError, EntityRef};
pub use fingerprint::graph_fingerprint;
pub use grants::{Capability, GrantSet, GrantTarget};
