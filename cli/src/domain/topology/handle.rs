//! Typed handles returned by declarations and consumed by later ones.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use stackcraft_common::{LogicalId, ResourceKind, ResourceRef};

use super::entity::Declaration;
use crate::domain::error::EntityRef;

static NEXT_GRAPH: AtomicU64 = AtomicU64::new(1);

/// Identity of one builder instance. Handles from another builder never
/// resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId(u64);

impl GraphId {
    pub(super) fn fresh() -> Self {
        Self(NEXT_GRAPH.fetch_add(1, Ordering::Relaxed))
    }
}

/// An entity type that can be declared in a topology.
pub trait Declared: Clone + Sized {
    const KIND: ResourceKind;

    fn name(&self) -> &str;

    fn into_declaration(self) -> Declaration;

    fn from_declaration(decl: &Declaration) -> Option<&Self>;

    fn entity(&self) -> EntityRef {
        EntityRef::new(Self::KIND, self.name())
    }
}

/// Reference to an entity declared earlier in the same builder.
///
/// Only [`TopologyBuilder`](super::TopologyBuilder) creates handles, so a
/// handle always names something that exists in the graph it came from.
pub struct Handle<T> {
    graph: GraphId,
    index: usize,
    id: LogicalId,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(super) fn new(graph: GraphId, index: usize, id: LogicalId) -> Self {
        Self {
            graph,
            index,
            id,
            _kind: PhantomData,
        }
    }

    pub(super) fn graph(&self) -> GraphId {
        self.graph
    }

    pub(super) fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn id(&self) -> &LogicalId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.id.name()
    }

    /// Reference to this entity's stable provider identifier.
    #[must_use]
    pub fn arn(&self) -> ResourceRef {
        ResourceRef::arn(&self.id)
    }

    /// Reference to this entity's short provider identifier.
    #[must_use]
    pub fn short_id(&self) -> ResourceRef {
        ResourceRef::id(&self.id)
    }
}

impl<T: Declared> Handle<T> {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self::new(self.graph, self.index, self.id.clone())
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph && self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("graph", &self.graph)
            .field("index", &self.index)
            .field("id", &self.id)
            .finish()
    }
}
