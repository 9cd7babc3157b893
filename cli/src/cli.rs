//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Compose and deploy a load-balanced container service stack
#[derive(Parser)]
#[command(
    name = "stackcraft",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Stack configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compose the stack and print its resource graph
    Synth(commands::synth::SynthArgs),

    /// Compose the stack and report the result
    Validate(commands::validate::ValidateArgs),

    /// Show the deploy principal's resolved permissions
    Grants(commands::grants::GrantsArgs),

    /// Apply the stack through the provisioning backend
    Deploy(commands::deploy::DeployArgs),

    /// Delete deployed resources, keeping retained ones
    Destroy,

    /// Delete the retained resources of a destroyed stack
    PurgeRetained,

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let flags = AppFlags {
            output: OutputFlags {
                no_color: self.no_color,
                quiet: self.quiet,
                json: self.json,
            },
            behaviour: BehaviourFlags {
                yes: self.yes,
                config: self.config,
            },
        };
        let app = AppContext::new(&flags)?;

        match self.command {
            Command::Synth(args) => commands::synth::run(&app, &args),
            Command::Validate(args) => commands::validate::run(&app, &args),
            Command::Grants(args) => commands::grants::run(&app, &args),
            Command::Deploy(args) => commands::deploy::run(&app, &args).await,
            Command::Destroy => commands::destroy::run(&app).await,
            Command::PurgeRetained => commands::destroy::purge_retained(&app).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
