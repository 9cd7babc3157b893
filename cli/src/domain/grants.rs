//! Access grant resolution for the deploy principal.
//!
//! [`resolve`] is a pure function from a principal and its targets to a
//! statement set holding at most one statement per capability. Resolving
//! the same inputs twice produces the same set.

use std::collections::BTreeMap;
use std::fmt;

use stackcraft_common::{
    Effect, LogicalId, PolicyCondition, PolicyResource, PolicyStatement, ResourceRef,
};

use crate::domain::error::CompositionError;

/// Service principal container tasks run as.
pub const TASK_SERVICE_PRINCIPAL: &str = "ecs-tasks.amazonaws.com";

const REGISTRY_AUTH_ACTIONS: &[&str] = &["ecr:GetAuthorizationToken"];

const IMAGE_PUSH_PULL_ACTIONS: &[&str] = &[
    "ecr:BatchCheckLayerAvailability",
    "ecr:BatchGetImage",
    "ecr:CompleteLayerUpload",
    "ecr:GetDownloadUrlForLayer",
    "ecr:InitiateLayerUpload",
    "ecr:PutImage",
    "ecr:UploadLayerPart",
];

const TASK_REGISTRATION_ACTIONS: &[&str] =
    &["ecs:DescribeTaskDefinition", "ecs:RegisterTaskDefinition"];

const SERVICE_ROLLOUT_ACTIONS: &[&str] = &["ecs:DescribeServices", "ecs:UpdateService"];

const ROLE_DELEGATION_ACTIONS: &[&str] = &["iam:PassRole"];

/// A group of actions the deploy principal needs for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Obtain a registry login token. Cannot be scoped to a repository.
    RegistryAuth,
    ImagePushPull,
    /// Register new task definition revisions. Cannot be scoped.
    TaskRegistration,
    ServiceRollout,
    /// Hand the execution role to the container agent.
    RoleDelegation,
}

impl Capability {
    #[must_use]
    pub fn actions(self) -> &'static [&'static str] {
        match self {
            Self::RegistryAuth => REGISTRY_AUTH_ACTIONS,
            Self::ImagePushPull => IMAGE_PUSH_PULL_ACTIONS,
            Self::TaskRegistration => TASK_REGISTRATION_ACTIONS,
            Self::ServiceRollout => SERVICE_ROLLOUT_ACTIONS,
            Self::RoleDelegation => ROLE_DELEGATION_ACTIONS,
        }
    }

    fn statement(self, resource: PolicyResource) -> PolicyStatement {
        let conditions = match self {
            Self::RoleDelegation => vec![PolicyCondition {
                operator: "StringEquals".to_string(),
                key: "iam:PassedToService".to_string(),
                value: TASK_SERVICE_PRINCIPAL.to_string(),
            }],
            _ => Vec::new(),
        };
        PolicyStatement {
            sid: self.to_string(),
            effect: Effect::Allow,
            actions: self.actions().iter().map(|a| (*a).to_string()).collect(),
            resources: [resource].into_iter().collect(),
            conditions,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RegistryAuth => "RegistryAuth",
            Self::ImagePushPull => "ImagePushPull",
            Self::TaskRegistration => "TaskRegistration",
            Self::ServiceRollout => "ServiceRollout",
            Self::RoleDelegation => "RoleDelegation",
        })
    }
}

/// Something the principal deploys into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantTarget {
    Registry(LogicalId),
    Service(LogicalId),
    ExecutionRole(LogicalId),
}

impl GrantTarget {
    fn capabilities(&self) -> Vec<(Capability, PolicyResource)> {
        let scoped = |id: &LogicalId| PolicyResource::Ref(ResourceRef::arn(id));
        match self {
            Self::Registry(id) => vec![
                (Capability::RegistryAuth, PolicyResource::Any),
                (Capability::ImagePushPull, scoped(id)),
            ],
            Self::Service(id) => vec![
                (Capability::TaskRegistration, PolicyResource::Any),
                (Capability::ServiceRollout, scoped(id)),
            ],
            Self::ExecutionRole(id) => vec![(Capability::RoleDelegation, scoped(id))],
        }
    }
}

/// Statements granted to one principal, keyed by capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantSet {
    principal: LogicalId,
    statements: BTreeMap<Capability, PolicyStatement>,
}

fn describe_scope(statement: &PolicyStatement) -> String {
    statement
        .resources
        .iter()
        .map(|r| match r {
            PolicyResource::Any => "*".to_string(),
            PolicyResource::Ref(r) => r.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl GrantSet {
    #[must_use]
    pub fn new(principal: LogicalId) -> Self {
        Self {
            principal,
            statements: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn principal(&self) -> &LogicalId {
        &self.principal
    }

    /// Add `statement` for `capability`.
    ///
    /// Inserting a statement identical to the one already held is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::DuplicateGrant`] if the capability is
    /// already granted with a different scope.
    pub fn insert(
        &mut self,
        capability: Capability,
        statement: PolicyStatement,
    ) -> Result<(), CompositionError> {
        match self.statements.get(&capability) {
            Some(existing) if *existing == statement => Ok(()),
            Some(existing) => Err(CompositionError::DuplicateGrant {
                principal: self.principal.name().to_string(),
                capability: capability.to_string(),
                existing: describe_scope(existing),
                requested: describe_scope(&statement),
            }),
            None => {
                self.statements.insert(capability, statement);
                Ok(())
            }
        }
    }

    pub fn statements(&self) -> impl Iterator<Item = &PolicyStatement> {
        self.statements.values()
    }

    #[must_use]
    pub fn into_statements(self) -> Vec<PolicyStatement> {
        self.statements.into_values().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Compute the minimal statement set `principal` needs over `targets`.
///
/// # Errors
///
/// Returns [`CompositionError::DuplicateGrant`] if two targets require the
/// same capability over different resources.
pub fn resolve(
    principal: &LogicalId,
    targets: &[GrantTarget],
) -> Result<GrantSet, CompositionError> {
    let mut set = GrantSet::new(principal.clone());
    for target in targets {
        for (capability, resource) in target.capabilities() {
            set.insert(capability, capability.statement(resource))?;
        }
    }
    Ok(set)
}
