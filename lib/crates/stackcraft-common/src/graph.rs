use serde::{Deserialize, Serialize};

use crate::id::{LogicalId, ResourceKind};
use crate::resource::Resource;

/// Account and region a graph is deployed into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    pub account: String,
    pub region: String,
}

/// A fully-wired resource graph, ordered so every resource follows the
/// resources it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGraph {
    pub stack: String,
    pub target: DeploymentTarget,
    pub resources: Vec<Resource>,
}

impl ResourceGraph {
    #[must_use]
    pub fn get(&self, id: &LogicalId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    /// Position of `id` in emission order.
    #[must_use]
    pub fn position(&self, id: &LogicalId) -> Option<usize> {
        self.resources.iter().position(|r| &r.id == id)
    }

    /// All resources of one kind, in emission order.
    pub fn of_kind(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.kind() == kind)
    }

    pub fn retained(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_retained())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
