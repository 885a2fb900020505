//! Formatting options and the full trend table

use super::colored::{format_heading, format_ms};
use super::{SummaryHandler, SummaryOutput};
use crate::{error::Result, models::SummaryData};
use std::fmt::Write as _;
use std::io::Write;

/// Configuration options for summary formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Also report the proxy-measured internal durations
    pub show_internal: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            show_internal: false,
        }
    }
}

impl FormattingOptions {
    /// No color, no extra lines
    pub fn plain() -> Self {
        Self {
            enable_color: false,
            show_internal: false,
        }
    }

    pub fn with_color(mut self, enable_color: bool) -> Self {
        self.enable_color = enable_color;
        self
    }

    pub fn with_internal(mut self, show_internal: bool) -> Self {
        self.show_internal = show_internal;
        self
    }
}

/// Load-test style table of every recorded trend.
///
/// The text is handed back to the driver instead of being written directly.
#[derive(Debug, Clone, Default)]
pub struct DefaultSummary {
    options: FormattingOptions,
}

impl DefaultSummary {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Render the table as a string
    pub fn render(&self, data: &SummaryData) -> Result<String> {
        let color = self.options.enable_color;
        let mut text = String::new();

        if data.metrics.is_empty() {
            writeln!(text, "No trends recorded.")?;
            return Ok(text);
        }

        let name_width = data.metrics.keys().map(|k| k.len()).max().unwrap_or(0) + 3;

        for (name, values) in &data.metrics {
            let dotted = format!("{}{}", name, ".".repeat(name_width - name.len()));
            writeln!(
                text,
                "     {}: avg={} min={} med={} max={} p(90)={} p(95)={} count={}",
                format_heading(&dotted, color),
                format_ms(values.avg, color),
                format_ms(values.min, color),
                format_ms(values.med, color),
                format_ms(values.max, color),
                format_ms(values.p90, color),
                format_ms(values.p95, color),
                values.count,
            )?;
        }

        Ok(text)
    }
}

impl SummaryHandler for DefaultSummary {
    fn handle_summary(&self, data: &SummaryData, _out: &mut dyn Write) -> Result<SummaryOutput> {
        Ok(SummaryOutput::stdout(self.render(data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrendValues;

    fn values() -> TrendValues {
        TrendValues { count: 4, min: 10.0, max: 40.0, avg: 25.0, med: 25.0, p90: 37.0, p95: 38.5 }
    }

    #[test]
    fn test_rows_are_sorted_and_aligned() {
        let data = SummaryData::new()
            .with_trend("http_req_duration_pocker", values())
            .with_trend("http_req_duration_direct", values());

        let text = DefaultSummary::new(FormattingOptions::plain()).render(&data).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("http_req_duration_direct...:"));
        assert!(lines[1].contains("http_req_duration_pocker...:"));
        assert!(!lines[0].contains("...."));
        assert!(lines[0].contains("avg=25.00ms min=10.00ms med=25.00ms max=40.00ms p(90)=37.00ms p(95)=38.50ms count=4"));
    }

    #[test]
    fn test_shorter_names_padded_to_longest() {
        let data = SummaryData::new()
            .with_trend("http_req_duration_direct", values())
            .with_trend("http_req_duration_pocker_cf", values());

        let text = DefaultSummary::new(FormattingOptions::plain()).render(&data).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("     http_req_duration_direct......: avg="));
        assert!(lines[1].starts_with("     http_req_duration_pocker_cf...: avg="));
    }

    #[test]
    fn test_empty_data() {
        let text = DefaultSummary::default().render(&SummaryData::new()).unwrap();
        assert_eq!(text, "No trends recorded.\n");
    }

    #[test]
    fn test_handler_returns_text_without_writing() {
        let data = SummaryData::new().with_trend("http_req_duration_direct", values());
        let mut out = Vec::new();

        let output = DefaultSummary::new(FormattingOptions::plain())
            .handle_summary(&data, &mut out)
            .unwrap();

        assert!(out.is_empty());
        assert!(output.stdout.unwrap().contains("p(95)=38.50ms"));
    }

    #[test]
    fn test_options_builders() {
        let options = FormattingOptions::default().with_color(false).with_internal(true);
        assert!(!options.enable_color);
        assert!(options.show_internal);
    }
}
