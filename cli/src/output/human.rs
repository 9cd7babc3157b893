//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;
use stackcraft_common::{LogicalId, PolicyResource, PolicyStatement};

use crate::application::services::deploy::DeployOutcome;
use crate::application::services::destroy::DestroyOutcome;
use crate::application::services::stack::{GrantReport, GraphSummary};
use crate::domain::config::StackConfig;
use crate::output::OutputContext;

/// Renders command results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("stackcraft {version}");
    }

    /// Render the current stack configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn render_config(&self, config: &StackConfig, path: &Path) -> Result<()> {
        let body = serde_yaml::to_string(config).context("cannot serialize config")?;
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        for line in body.lines() {
            println!("  {line}");
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        for var in [
            "STACKCRAFT_CONFIG",
            "STACKCRAFT_STATE_DIR",
            "STACKCRAFT_CERTIFICATE_ARN",
            "NO_COLOR",
        ] {
            println!(
                "    {:<28} {}",
                format!("{var}:"),
                std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
            );
        }
        println!();
        Ok(())
    }

    /// Confirm a stored config value.
    pub fn render_config_set(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    /// Render a validated graph.
    pub fn render_summary(&self, summary: &GraphSummary) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header(&format!(
            "Stack {} ({} / {})",
            summary.stack, summary.account, summary.region
        ));
        println!();
        for entry in &summary.resources {
            let marker = if entry.retained {
                format!("  {}", "[retained]".style(self.ctx.styles.retained))
            } else {
                String::new()
            };
            println!(
                "    {:<20} {}{marker}",
                entry.kind.to_string().style(self.ctx.styles.dim),
                entry.id
            );
        }
        println!();
        self.ctx
            .success(&format!("{} resources composed", summary.resources.len()));
        self.ctx.kv("fingerprint", &summary.fingerprint);
    }

    /// Render the deploy principal's statements.
    pub fn render_grants(&self, reports: &[GrantReport]) {
        for report in reports {
            println!();
            println!(
                "  {} {}",
                report.principal.style(self.ctx.styles.header),
                format!("({})", report.grant).style(self.ctx.styles.dim)
            );
            for statement in &report.statements {
                self.render_statement(statement);
            }
        }
        println!();
    }

    fn render_statement(&self, statement: &PolicyStatement) {
        println!();
        println!("    {}", statement.sid.style(self.ctx.styles.bold));
        for action in &statement.actions {
            println!("      allow  {action}");
        }
        for resource in &statement.resources {
            let shown = match resource {
                PolicyResource::Any => "*".to_string(),
                PolicyResource::Ref(r) => r.to_string(),
            };
            println!("      on     {shown}");
        }
        for condition in &statement.conditions {
            println!(
                "      when   {} {} = {}",
                condition.operator, condition.key, condition.value
            );
        }
    }

    /// Render the per-resource result of a deploy.
    pub fn render_deploy(&self, outcome: &DeployOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        for applied in &outcome.applied {
            let action = format!("{:<10}", applied.action.to_string());
            println!(
                "    {} {:<40} {}",
                action.style(self.ctx.styles.action(applied.action)),
                applied.id.as_str(),
                applied.physical_id
            );
        }
        self.render_ids("removed", &outcome.removed);
        if !outcome.orphaned.is_empty() {
            println!();
            self.ctx.warn(&format!(
                "{} retained resource(s) left in place: {}",
                outcome.orphaned.len(),
                join_ids(&outcome.orphaned)
            ));
        }
        println!();
    }

    /// Render the result of a destroy.
    pub fn render_destroy(&self, outcome: &DestroyOutcome) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.render_ids("deleted", &outcome.deleted);
        if !outcome.retained.is_empty() {
            for id in &outcome.retained {
                println!("    {:<10} {id}", "kept".style(self.ctx.styles.retained));
            }
            println!();
            self.ctx
                .info("Retained resources are removed only by: stackcraft purge-retained");
        }
        println!();
    }

    /// Render the resources removed by purge-retained.
    pub fn render_purged(&self, purged: &[LogicalId]) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.render_ids("purged", purged);
        println!();
    }

    fn render_ids(&self, label: &str, ids: &[LogicalId]) {
        for id in ids {
            println!("    {:<10} {id}", label.style(self.ctx.styles.dim));
        }
    }
}

#[must_use]
pub fn join_ids(ids: &[LogicalId]) -> String {
    ids.iter()
        .map(LogicalId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
