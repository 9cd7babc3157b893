//! Command implementations

pub mod config;
pub mod deploy;
pub mod destroy;
pub mod grants;
pub mod synth;
pub mod validate;
pub mod version;

use clap::Args;

use crate::domain::config::DeployParameters;

/// Deploy-time overrides applied on top of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct StackArgs {
    /// Certificate ARN for an HTTPS listener
    #[arg(long, env = "STACKCRAFT_CERTIFICATE_ARN")]
    pub certificate: Option<String>,

    /// Container image tag to deploy
    #[arg(long, env = "STACKCRAFT_IMAGE_TAG")]
    pub image_tag: Option<String>,

    /// Number of service tasks to run
    #[arg(long)]
    pub desired_count: Option<u32>,

    /// Target account ID
    #[arg(long, env = "STACKCRAFT_ACCOUNT")]
    pub account: Option<String>,

    /// Target region
    #[arg(long, env = "STACKCRAFT_REGION")]
    pub region: Option<String>,
}

impl StackArgs {
    #[must_use]
    pub fn parameters(&self) -> DeployParameters {
        DeployParameters {
            certificate: self.certificate.clone(),
            image_tag: self.image_tag.clone(),
            desired_count: self.desired_count,
            account: self.account.clone(),
            region: self.region.clone(),
        }
    }
}
