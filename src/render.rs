//! Terminal rendering for startup reports and analyzer listings.

use owo_colors::{OwoColorize, Rgb};

use crate::analysis::AnalysisStrategy;
use crate::startup::FailureReport;
use std::sync::Arc;

/// 24-bit RGB palette for terminal output.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Recoverable / success - green (34, 197, 94)
    pub success: Rgb,
    /// Failure headline - red (239, 68, 68)
    pub error: Rgb,
    /// Actions - yellow (234, 179, 8)
    pub warning: Rgb,
    /// Secondary text - gray (107, 114, 128)
    pub muted: Rgb,
    /// Analyzer names - cyan (34, 211, 238)
    pub highlight: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Rgb(34, 197, 94),
            error: Rgb(239, 68, 68),
            warning: Rgb(234, 179, 8),
            muted: Rgb(107, 114, 128),
            highlight: Rgb(34, 211, 238),
        }
    }
}

/// Renders reports as plain or colored text.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    theme: Theme,
    use_color: bool,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer {
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
            use_color: true,
        }
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.use_color = enabled;
        self
    }

    /// Render a startup failure report. The first description line is the title.
    pub fn render_report(&self, report: &FailureReport) -> String {
        if !self.use_color {
            return format!("{}\n{}", report.description, report.action);
        }

        let mut output = String::new();
        let mut lines = report.description.lines();
        if let Some(title) = lines.next() {
            output.push_str(&format!("{}\n", title.color(self.theme.error).bold()));
        }
        for line in lines {
            output.push_str(&format!("{}\n", line.color(self.theme.muted)));
        }
        output.push('\n');
        for line in report.action.lines() {
            output.push_str(&format!("{}\n", line.color(self.theme.warning)));
        }
        output
    }

    /// Render strategies as `priority  name` rows under a heading.
    pub fn render_strategies(
        &self,
        heading: &str,
        strategies: &[Arc<dyn AnalysisStrategy>],
    ) -> String {
        let mut output = if self.use_color {
            format!("{}\n", heading.bold())
        } else {
            format!("{}\n", heading)
        };
        for strategy in strategies {
            let priority = format!("{:>6}", strategy.priority());
            if self.use_color {
                output.push_str(&format!(
                    "{}  {}\n",
                    priority.color(self.theme.muted),
                    strategy.name().color(self.theme.highlight)
                ));
            } else {
                output.push_str(&format!("{}  {}\n", priority, strategy.name()));
            }
        }
        output
    }
}
