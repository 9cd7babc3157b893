//! Unit tests for the stackcraft CLI library
//!
//! These tests use in-memory port implementations and run fast without
//! external I/O.

mod architecture;
mod config_service;
mod deploy_service;
mod helpers;
mod mocks;
mod property_tests;
