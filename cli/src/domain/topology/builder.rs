//! Single-pass graph builder.
//!
//! Each `declare_*` call validates one entity against the entities it
//! references and appends it to the graph, so emission order is always a
//! valid creation order. The per-kind declarations live in the sibling
//! modules; this file owns handle resolution and emission.

use stackcraft_common::{
    DeploymentTarget, LogicalId, RemovalPolicy, Resource, ResourceGraph, ResourceProperties,
};
use tracing::debug;

use super::entity::Declaration;
use super::handle::{Declared, GraphId, Handle};
use crate::domain::error::{CompositionError, EntityRef};

struct Entry {
    declaration: Declaration,
    resource: Resource,
}

pub struct TopologyBuilder {
    graph: GraphId,
    stack: String,
    target: DeploymentTarget,
    entries: Vec<Entry>,
}

impl TopologyBuilder {
    #[must_use]
    pub fn new(stack: impl Into<String>, target: DeploymentTarget) -> Self {
        Self {
            graph: GraphId::fresh(),
            stack: stack.into(),
            target,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn stack(&self) -> &str {
        &self.stack
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handle of the `T` declared under `name`, if any.
    ///
    /// Used to turn names coming from configuration into handles.
    #[must_use]
    pub fn lookup<T: Declared>(&self, name: &str) -> Option<Handle<T>> {
        let id = LogicalId::new(T::KIND, name);
        self.entries
            .iter()
            .position(|e| e.resource.id == id)
            .map(|index| Handle::new(self.graph, index, id))
    }

    /// Resolve `handle` on behalf of `owner`'s `field`.
    ///
    /// # Errors
    ///
    /// Returns a reference error if the handle belongs to another builder.
    pub(super) fn resolve<T: Declared>(
        &self,
        owner: &EntityRef,
        field: &'static str,
        handle: &Handle<T>,
    ) -> Result<&T, CompositionError> {
        let dangling =
            || CompositionError::reference(owner.clone(), field, T::KIND, handle.name());
        if handle.graph() != self.graph {
            return Err(dangling());
        }
        let entry = self.entries.get(handle.index()).ok_or_else(dangling)?;
        if &entry.resource.id != handle.id() {
            return Err(dangling());
        }
        T::from_declaration(&entry.declaration).ok_or_else(dangling)
    }

    /// Every declared `T` with its logical ID, in declaration order.
    pub(super) fn declared<'a, T: Declared + 'a>(
        &'a self,
    ) -> impl Iterator<Item = (&'a LogicalId, &'a T)> {
        self.entries
            .iter()
            .filter_map(|e| T::from_declaration(&e.declaration).map(|t| (&e.resource.id, t)))
    }

    /// Reject a second entity of the same kind and name.
    pub(super) fn ensure_unique<T: Declared>(&self, entity: &T) -> Result<(), CompositionError> {
        let id = LogicalId::new(T::KIND, entity.name());
        if self.entries.iter().any(|e| e.resource.id == id) {
            return Err(CompositionError::constraint(
                entity.entity(),
                "name",
                format!("another {} named '{}' is already declared", T::KIND, entity.name()),
            ));
        }
        Ok(())
    }

    pub(super) fn emit<T: Declared>(
        &mut self,
        entity: T,
        removal_policy: RemovalPolicy,
        properties: ResourceProperties,
    ) -> Handle<T> {
        let id = LogicalId::new(T::KIND, entity.name());
        let mut depends_on: Vec<LogicalId> = Vec::new();
        for reference in properties.references() {
            if !depends_on.contains(&reference.target) {
                depends_on.push(reference.target.clone());
            }
        }
        debug!(
            id = %id,
            depends_on = depends_on.len(),
            removal = ?removal_policy,
            "declared resource"
        );

        let index = self.entries.len();
        self.entries.push(Entry {
            declaration: entity.into_declaration(),
            resource: Resource {
                id: id.clone(),
                removal_policy,
                depends_on,
                properties,
            },
        });
        Handle::new(self.graph, index, id)
    }

    /// Check every reference points backwards and hand out the graph.
    ///
    /// # Errors
    ///
    /// Returns a reference error naming the first resource whose reference
    /// target is missing or declared after it.
    pub fn finish(self) -> Result<ResourceGraph, CompositionError> {
        for (position, entry) in self.entries.iter().enumerate() {
            let resource = &entry.resource;
            for reference in resource.properties.references() {
                let earlier = self.entries[..position]
                    .iter()
                    .any(|e| e.resource.id == reference.target);
                if !earlier {
                    let target_kind = self
                        .entries
                        .iter()
                        .find(|e| e.resource.id == reference.target)
                        .map_or(resource.kind(), |e| e.resource.kind());
                    return Err(CompositionError::reference(
                        EntityRef::new(resource.kind(), resource.id.name()),
                        "depends_on",
                        target_kind,
                        reference.target.name(),
                    ));
                }
            }
        }
        debug!(stack = %self.stack, resources = self.entries.len(), "graph complete");
        Ok(ResourceGraph {
            stack: self.stack,
            target: self.target,
            resources: self.entries.into_iter().map(|e| e.resource).collect(),
        })
    }
}
