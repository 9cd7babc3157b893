//! Stylesheet for terminal output.
//!
//! Every field starts as the plain `Style::new()`; `colorize` fills them in
//! only when the terminal and flags allow color.

use owo_colors::Style;

use crate::application::ports::ApplyAction;

#[derive(Default, Clone)]
pub struct Styles {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub info: Style,
    pub dim: Style,
    pub bold: Style,
    pub header: Style,
    /// Marker for resources kept across destroy.
    pub retained: Style,
}

impl Styles {
    pub fn colorize(&mut self) {
        *self = Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            info: Style::new().blue(),
            dim: Style::new().dimmed(),
            bold: Style::new().bold(),
            header: Style::new().bold().cyan(),
            retained: Style::new().magenta(),
        };
    }

    /// Style for the action column of a deploy report.
    #[must_use]
    pub fn action(&self, action: ApplyAction) -> Style {
        match action {
            ApplyAction::Created => self.success,
            ApplyAction::Updated => self.warning,
            ApplyAction::Unchanged => self.dim,
        }
    }
}
