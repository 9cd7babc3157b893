//! Shared helpers for spawning the binary against a scratch workspace.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

pub const CERT: &str =
    "arn:aws:acm:us-east-1:123456789012:certificate/2f0c1c9e-5c0a-4a55-9d7b-000000000001";

/// A scratch directory holding a config file path and a state directory.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("stackcraft.yaml")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.dir.path().join("state")
    }

    /// A `stackcraft` command isolated to this workspace.
    pub fn cmd(&self) -> Command {
        let mut cmd = stackcraft();
        cmd.env("STACKCRAFT_CONFIG", self.config_path())
            .env("STACKCRAFT_STATE_DIR", self.state_dir())
            .env_remove("STACKCRAFT_CERTIFICATE_ARN")
            .env_remove("STACKCRAFT_YES")
            .current_dir(self.dir.path());
        cmd
    }
}

pub fn stackcraft() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stackcraft"));
    cmd.env("NO_COLOR", "1");
    cmd
}
