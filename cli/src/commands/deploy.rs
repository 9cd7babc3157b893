//! `stackcraft deploy`: apply the composed stack through the provisioning backend.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::{deploy, stack};
use crate::commands::StackArgs;
use crate::output::TerminalReporter;

#[derive(Args)]
pub struct DeployArgs {
    #[command(flatten)]
    pub stack: StackArgs,
}

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if composition fails or the backend rejects a resource.
pub async fn run(app: &AppContext, args: &DeployArgs) -> Result<ExitCode> {
    let config = stack::resolve_config(&app.config_store, &args.stack.parameters())?;
    let graph = stack::synthesize(&config)?;

    let prompt = format!(
        "Deploy {} resources of stack '{}' to {}/{}?",
        graph.len(),
        graph.stack,
        graph.target.account,
        graph.target.region
    );
    if !app.confirm(&prompt, true)? {
        app.output.info("Deploy cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let reporter = TerminalReporter::new(&app.output);
    let outcome = deploy::deploy(&app.backend, &reporter, &graph).await?;
    drop(reporter);
    app.renderer().render_deploy(&outcome)?;
    Ok(ExitCode::SUCCESS)
}
