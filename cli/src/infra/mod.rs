//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: config file access and the
//! local provisioning backend's state files.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod backend;
pub mod config;
