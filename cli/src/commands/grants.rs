//! `stackcraft grants`: show what the deploy principal is allowed to do.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::stack;
use crate::commands::StackArgs;

#[derive(Args)]
pub struct GrantsArgs {
    #[command(flatten)]
    pub stack: StackArgs,
}

/// Run the grants command.
///
/// # Errors
///
/// Returns an error if the stack cannot be composed.
pub fn run(app: &AppContext, args: &GrantsArgs) -> Result<ExitCode> {
    let config = stack::resolve_config(&app.config_store, &args.stack.parameters())?;
    let graph = stack::synthesize(&config)?;
    app.renderer()
        .render_grants(&stack::principal_grants(&graph)?)?;
    Ok(ExitCode::SUCCESS)
}
