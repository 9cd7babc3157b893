//! Registry, identity and access grant declarations.

use stackcraft_common::{
    AccessGrantProperties, DeployPrincipalProperties, ExecutionRoleProperties,
    ImageRegistryProperties, RemovalPolicy, ResourceProperties, TagMutability,
};

use super::builder::TopologyBuilder;
use super::entity::{AccessGrant, DeployPrincipal, ExecutionRole, GrantScope, ImageRegistry};
use super::handle::{Declared, Handle};
use crate::domain::error::CompositionError;
use crate::domain::grants::{self, GrantTarget, TASK_SERVICE_PRINCIPAL};
use crate::domain::naming::NameRule;

pub const TASK_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

fn check_name<T: Declared>(entity: &T, rule: NameRule) -> Result<(), CompositionError> {
    rule.check(entity.name())
        .map_err(|reason| CompositionError::constraint(entity.entity(), "name", reason))
}

impl TopologyBuilder {
    /// Registries outlive the stack so pushed images are never stranded.
    ///
    /// # Errors
    ///
    /// Rejects invalid or duplicate repository names.
    pub fn declare_image_registry(
        &mut self,
        registry: ImageRegistry,
    ) -> Result<Handle<ImageRegistry>, CompositionError> {
        check_name(&registry, NameRule::Registry)?;
        self.ensure_unique(&registry)?;
        let properties = ResourceProperties::ImageRegistry(ImageRegistryProperties {
            name: registry.name.clone(),
            scan_on_push: registry.scan_on_push,
            tag_mutability: if registry.immutable_tags {
                TagMutability::Immutable
            } else {
                TagMutability::Mutable
            },
        });
        Ok(self.emit(registry, RemovalPolicy::Retain, properties))
    }

    /// The deploy principal is retained with its grant so CI credentials
    /// survive a teardown.
    ///
    /// # Errors
    ///
    /// Rejects invalid or duplicate user names.
    pub fn declare_deploy_principal(
        &mut self,
        principal: DeployPrincipal,
    ) -> Result<Handle<DeployPrincipal>, CompositionError> {
        check_name(&principal, NameRule::Iam)?;
        self.ensure_unique(&principal)?;
        let properties = ResourceProperties::DeployPrincipal(DeployPrincipalProperties {
            name: principal.name.clone(),
        });
        Ok(self.emit(principal, RemovalPolicy::Retain, properties))
    }

    /// # Errors
    ///
    /// Rejects invalid or duplicate role names.
    pub fn declare_execution_role(
        &mut self,
        role: ExecutionRole,
    ) -> Result<Handle<ExecutionRole>, CompositionError> {
        check_name(&role, NameRule::Iam)?;
        self.ensure_unique(&role)?;
        let properties = ResourceProperties::ExecutionRole(ExecutionRoleProperties {
            name: role.name.clone(),
            assumed_by: TASK_SERVICE_PRINCIPAL.to_string(),
            managed_policies: vec![TASK_EXECUTION_POLICY.to_string()],
        });
        Ok(self.emit(role, RemovalPolicy::Destroy, properties))
    }

    /// Bind the resolved statement set to the principal.
    ///
    /// Declared after every scope it covers.
    ///
    /// # Errors
    ///
    /// Rejects unresolved handles, an empty scope list and capabilities
    /// requested over diverging resources.
    pub fn declare_access_grant(
        &mut self,
        grant: AccessGrant,
    ) -> Result<Handle<AccessGrant>, CompositionError> {
        let entity = grant.entity();
        check_name(&grant, NameRule::Iam)?;
        self.ensure_unique(&grant)?;
        self.resolve(&entity, "principal", &grant.principal)?;
        if grant.scopes.is_empty() {
            return Err(CompositionError::constraint(
                entity,
                "scopes",
                "a grant must cover at least one registry, service or role",
            ));
        }

        let mut targets = Vec::with_capacity(grant.scopes.len());
        for scope in &grant.scopes {
            let target = match scope {
                GrantScope::Registry(h) => {
                    self.resolve(&entity, "scopes", h)?;
                    GrantTarget::Registry(h.id().clone())
                }
                GrantScope::Service(h) => {
                    self.resolve(&entity, "scopes", h)?;
                    GrantTarget::Service(h.id().clone())
                }
                GrantScope::ExecutionRole(h) => {
                    self.resolve(&entity, "scopes", h)?;
                    GrantTarget::ExecutionRole(h.id().clone())
                }
            };
            targets.push(target);
        }
        let statements = grants::resolve(grant.principal.id(), &targets)?.into_statements();

        let properties = ResourceProperties::AccessGrant(AccessGrantProperties {
            name: grant.name.clone(),
            principal: grant.principal.arn(),
            statements,
        });
        Ok(self.emit(grant, RemovalPolicy::Retain, properties))
    }
}
