//! Integration tests for the stackcraft CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! Every test points the config file and state directory at a temp dir.

mod cli_tests;
mod support;
mod synth_command;
