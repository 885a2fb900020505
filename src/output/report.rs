//! The p(95) report printed at the end of a probe run

use super::colored::{format_heading, format_ms, format_no_data};
use super::{FormattingOptions, SummaryHandler, SummaryOutput};
use crate::{error::Result, models::SummaryData, types::Target};
use std::io::Write;

/// Writes the three p(95) lines itself and suppresses any other summary
#[derive(Debug, Clone, Default)]
pub struct P95Report {
    options: FormattingOptions,
}

impl P95Report {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    fn line(&self, label: &str, value: Option<f64>) -> String {
        let color = self.options.enable_color;
        let value = match value {
            Some(v) => format_ms(v, color),
            None => format_no_data(color),
        };
        format!("- {}: {}", label, value)
    }

    /// Report lines in output order, heading included
    pub fn lines(&self, data: &SummaryData) -> Vec<String> {
        let mut lines = vec![format_heading("P(95) Metrics:", self.options.enable_color)];

        for target in Target::ALL {
            lines.push(self.line(target.route_label(), data.p95(target.duration_trend())));
        }

        if self.options.show_internal {
            for target in Target::ALL {
                if let Some(trend) = target.internal_trend() {
                    let label = format!("{} (internal)", target.route_label());
                    lines.push(self.line(&label, data.p95(trend)));
                }
            }
        }

        lines
    }
}

impl SummaryHandler for P95Report {
    fn handle_summary(&self, data: &SummaryData, out: &mut dyn Write) -> Result<SummaryOutput> {
        for line in self.lines(data) {
            writeln!(out, "{}", line)?;
        }
        Ok(SummaryOutput::empty())
    }
}
