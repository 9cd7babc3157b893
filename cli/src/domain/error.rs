//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::fmt;

use stackcraft_common::ResourceKind;
use thiserror::Error;

// ── Composition errors ────────────────────────────────────────────────────────

/// The entity an error is reported against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: ResourceKind,
    pub name: String,
}

impl EntityRef {
    #[must_use]
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.name)
    }
}

/// Rejection raised while composing a resource graph.
///
/// Every variant aborts the whole build; nothing is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error(
        "ReferenceError: {entity} field `{field}` refers to {target_kind} '{target}', which is not declared earlier in this graph"
    )]
    Reference {
        entity: EntityRef,
        field: &'static str,
        target_kind: ResourceKind,
        target: String,
    },

    #[error("ConstraintViolation: {entity} field `{field}`: {reason}")]
    Constraint {
        entity: EntityRef,
        field: &'static str,
        reason: String,
    },

    #[error(
        "DuplicateGrantError: principal '{principal}' is granted {capability} twice with diverging scopes ({existing} vs {requested})"
    )]
    DuplicateGrant {
        principal: String,
        capability: String,
        existing: String,
        requested: String,
    },
}

impl CompositionError {
    pub fn reference(
        entity: EntityRef,
        field: &'static str,
        target_kind: ResourceKind,
        target: impl Into<String>,
    ) -> Self {
        Self::Reference {
            entity,
            field,
            target_kind,
            target: target.into(),
        }
    }

    pub fn constraint(entity: EntityRef, field: &'static str, reason: impl Into<String>) -> Self {
        Self::Constraint {
            entity,
            field,
            reason: reason.into(),
        }
    }

    /// The offending entity, when the error is tied to one.
    #[must_use]
    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            Self::Reference { entity, .. } | Self::Constraint { entity, .. } => Some(entity),
            Self::DuplicateGrant { .. } => None,
        }
    }

    /// The offending field, when the error is tied to one.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Reference { field, .. } | Self::Constraint { field, .. } => Some(field),
            Self::DuplicateGrant { .. } => None,
        }
    }

    /// Machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Reference { .. } => "reference_error",
            Self::Constraint { .. } => "constraint_violation",
            Self::DuplicateGrant { .. } => "duplicate_grant",
        }
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nExpected: {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },

    #[error("Invalid deployment target: {0}")]
    InvalidTarget(String),
}
