//! State shared by every command handler: output, config store, backend
//! and prompt policy.

use anyhow::Result;

use crate::infra::backend::LocalStateBackend;
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct OutputFlags {
    pub no_color: bool,
    pub quiet: bool,
    pub json: bool,
}

pub struct BehaviourFlags {
    /// Answer yes to every confirmation (also set by `STACKCRAFT_YES`).
    pub yes: bool,
    /// Explicit config file path.
    pub config: Option<std::path::PathBuf>,
}

/// Global flags collected by `Cli::run`.
pub struct AppFlags {
    pub output: OutputFlags,
    pub behaviour: BehaviourFlags,
}

pub struct AppContext {
    /// Terminal output context (colors, quiet mode). Quiet in JSON mode.
    pub output: OutputContext,
    pub mode: OutputMode,
    /// Stack configuration file.
    pub config_store: YamlConfigStore,
    /// Provisioning backend tracking deployed state.
    pub backend: LocalStateBackend,
    /// When `true`, every confirmation is answered yes.
    pub assume_yes: bool,
    /// When `true`, prompts are skipped and their default is used (`CI` set).
    pub non_interactive: bool,
}

impl AppContext {
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let assume_yes = flags.behaviour.yes || std::env::var("STACKCRAFT_YES").is_ok();
        let non_interactive = std::env::var("CI").is_ok();

        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Ok(Self {
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            config_store: YamlConfigStore::new(flags.behaviour.config.clone()),
            backend: LocalStateBackend::new()?,
            assume_yes,
            non_interactive,
        })
    }

    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Ask before a backend mutation. `--yes` answers yes; under `CI` the
    /// prompt's default is taken without asking.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails (e.g. no TTY available).
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        if self.non_interactive {
            return Ok(default);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?;
        Ok(confirmed)
    }
}
