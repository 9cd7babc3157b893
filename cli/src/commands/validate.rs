//! `stackcraft validate`: compose the stack and report the result.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::stack;
use crate::commands::StackArgs;

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub stack: StackArgs,
}

/// Run the validate command.
///
/// # Errors
///
/// Returns the first composition error.
pub fn run(app: &AppContext, args: &ValidateArgs) -> Result<ExitCode> {
    let config = stack::resolve_config(&app.config_store, &args.stack.parameters())?;
    let graph = stack::synthesize(&config)?;
    app.renderer().render_summary(&stack::summarize(&graph)?)?;
    Ok(ExitCode::SUCCESS)
}
