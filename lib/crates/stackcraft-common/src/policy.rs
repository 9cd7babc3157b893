use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::ResourceRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
}

/// Resource scope of a statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyResource {
    /// `*`: only for actions the provider cannot scope to a resource.
    Any,
    Ref(ResourceRef),
}

/// Condition attached to a statement, e.g. `StringEquals iam:PassedToService`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyCondition {
    pub operator: String,
    pub key: String,
    pub value: String,
}

/// One permission statement of an access grant.
///
/// Actions and resources are ordered sets so that two statements with the
/// same content always compare and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub sid: String,
    pub effect: Effect,
    pub actions: BTreeSet<String>,
    pub resources: BTreeSet<PolicyResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<PolicyCondition>,
}

impl PolicyStatement {
    /// Whether this statement grants `action` over `resource`.
    #[must_use]
    pub fn grants(&self, action: &str, resource: &PolicyResource) -> bool {
        self.actions.contains(action) && self.resources.contains(resource)
    }
}
