//! `stackcraft destroy` and `stackcraft purge-retained`.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{config_service, destroy};
use crate::output::TerminalReporter;

/// Run the destroy command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or a deletion fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let stack = config_service::load_config(&app.config_store)?.stack.name;
    if !app.confirm(
        &format!("Destroy stack '{stack}'? Retained resources are kept."),
        false,
    )? {
        app.output.info("Destroy cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let reporter = TerminalReporter::new(&app.output);
    let outcome = destroy::destroy(&app.backend, &reporter, &stack).await?;
    drop(reporter);
    app.renderer().render_destroy(&outcome)?;
    Ok(ExitCode::SUCCESS)
}

/// Run the purge-retained command.
///
/// # Errors
///
/// Returns an error if non-retained resources remain or a deletion fails.
pub async fn purge_retained(app: &AppContext) -> Result<ExitCode> {
    let stack = config_service::load_config(&app.config_store)?.stack.name;
    if !app.confirm(
        &format!("Permanently delete the retained resources of stack '{stack}'?"),
        false,
    )? {
        app.output.info("Purge cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let reporter = TerminalReporter::new(&app.output);
    let purged = destroy::purge_retained(&app.backend, &reporter, &stack).await?;
    drop(reporter);
    app.renderer().render_purged(&purged)?;
    Ok(ExitCode::SUCCESS)
}
