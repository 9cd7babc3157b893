//! Wire types for the resource graph emitted by the stackcraft composer.
//!
//! A provisioning backend only needs this crate: it walks a [`ResourceGraph`]
//! in order, resolves every [`ResourceRef`] against identifiers it returned
//! for earlier resources, and materializes the declared properties.

pub mod graph;
pub mod id;
pub mod policy;
pub mod resource;

pub use graph::{DeploymentTarget, ResourceGraph};
pub use id::{Attribute, LogicalId, ResourceKind, ResourceRef};
pub use policy::{Effect, PolicyCondition, PolicyResource, PolicyStatement};
pub use resource::*;
