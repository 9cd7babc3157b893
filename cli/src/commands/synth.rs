//! `stackcraft synth`: compose the stack and emit its resource graph.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use stackcraft_common::ResourceGraph;

use crate::app::AppContext;
use crate::application::services::stack;
use crate::commands::StackArgs;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    #[default]
    Json,
    Yaml,
}

/// Arguments for the synth command.
#[derive(Args)]
pub struct SynthArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = GraphFormat::Json)]
    pub format: GraphFormat,

    /// Write the graph to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub stack: StackArgs,
}

/// Serialize `graph` in the requested format.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(graph: &ResourceGraph, format: GraphFormat) -> Result<String> {
    match format {
        GraphFormat::Json => {
            serde_json::to_string_pretty(graph).context("cannot encode graph as JSON")
        }
        GraphFormat::Yaml => serde_yaml::to_string(graph).context("cannot encode graph as YAML"),
    }
}

/// Run the synth command.
///
/// # Errors
///
/// Returns an error if the stack cannot be composed or the graph cannot be
/// written.
pub fn run(app: &AppContext, args: &SynthArgs) -> Result<ExitCode> {
    let config = stack::resolve_config(&app.config_store, &args.stack.parameters())?;
    let graph = stack::synthesize(&config)?;
    let body = encode(&graph, args.format)?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, body)
                .with_context(|| format!("cannot write {}", path.display()))?;
            app.output.success(&format!(
                "{} resources written to {}",
                graph.len(),
                path.display()
            ));
        }
        None => println!("{}", body.trim_end()),
    }
    Ok(ExitCode::SUCCESS)
}
