//! Provider naming rules for declared resources.
//!
//! Pure functions only: no I/O, no async.

use regex::Regex;
use std::sync::LazyLock;

/// Image repository names: lowercase path components separated by `/`.
pub static REGISTRY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern, cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9]+(?:[._-][a-z0-9]+)*(?:/[a-z0-9]+(?:[._-][a-z0-9]+)*)*$")
        .expect("valid regex")
});

/// Cluster, service, task family and container names.
pub static RESOURCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_-]{1,255}$").expect("valid regex")
});

/// Load balancer and target group names: 1-32 alphanumerics with interior hyphens.
pub static ELB_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,30}[A-Za-z0-9])?$").expect("valid regex")
});

/// IAM user and role names.
pub static IAM_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[\w+=,.@-]{1,64}$").expect("valid regex")
});

pub static IMAGE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("valid regex")
});

pub static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\d{12}$").expect("valid regex")
});

pub static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z]{2}(?:-gov)?-[a-z]+-\d$").expect("valid regex")
});

/// Which naming rule a name is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    Registry,
    Resource,
    LoadBalancing,
    Iam,
}

impl NameRule {
    /// Check `name`, returning a human-readable reason on failure.
    ///
    /// # Errors
    ///
    /// Returns the violated rule as a message.
    pub fn check(self, name: &str) -> Result<(), String> {
        match self {
            Self::Registry => {
                if !(2..=256).contains(&name.len()) || !REGISTRY_NAME_RE.is_match(name) {
                    return Err(format!(
                        "'{name}' must be 2-256 lowercase alphanumerics separated by '.', '_', '-' or '/'"
                    ));
                }
            }
            Self::Resource => {
                if !RESOURCE_NAME_RE.is_match(name) {
                    return Err(format!(
                        "'{name}' must be 1-255 letters, digits, hyphens or underscores"
                    ));
                }
            }
            Self::LoadBalancing => {
                if !ELB_NAME_RE.is_match(name) {
                    return Err(format!(
                        "'{name}' must be 1-32 alphanumerics with interior hyphens"
                    ));
                }
                if name.starts_with("internal-") {
                    return Err(format!("'{name}' must not start with 'internal-'"));
                }
            }
            Self::Iam => {
                if !IAM_NAME_RE.is_match(name) {
                    return Err(format!(
                        "'{name}' must be 1-64 characters from [A-Za-z0-9+=,.@_-]"
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Returns `true` if `tag` is a valid image tag.
pub fn is_valid_image_tag(tag: &str) -> bool {
    IMAGE_TAG_RE.is_match(tag)
}
