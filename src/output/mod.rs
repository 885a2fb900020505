//! End-of-run summary output
//!
//! After the load phase the driver hands the aggregated [`SummaryData`] to a
//! [`SummaryHandler`]. A handler may write its own report directly and return
//! an empty [`SummaryOutput`], in which case nothing else is printed, or it
//! may return text for the driver to print.

mod colored;
mod formatter;
mod report;

pub use self::colored::LatencyLevel;
pub use formatter::{DefaultSummary, FormattingOptions};
pub use report::P95Report;

use crate::{error::Result, models::SummaryData};
use std::io::Write;

/// What the driver should print after a handler ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryOutput {
    /// Text destined for stdout
    pub stdout: Option<String>,
}

impl SummaryOutput {
    /// Nothing further to print
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn stdout(text: String) -> Self {
        Self { stdout: Some(text) }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_none()
    }
}

/// Turns aggregated run data into a report
pub trait SummaryHandler: Send + Sync {
    fn handle_summary(&self, data: &SummaryData, out: &mut dyn Write) -> Result<SummaryOutput>;
}

/// Run a handler and print whatever it hands back
pub fn emit_summary(handler: &dyn SummaryHandler, data: &SummaryData, out: &mut dyn Write) -> Result<()> {
    let output = handler.handle_summary(data, out)?;
    if let Some(text) = output.stdout {
        out.write_all(text.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

/// Summary handler factory
pub struct SummaryHandlerFactory;

impl SummaryHandlerFactory {
    /// The custom p(95) report unless the default summary was requested
    pub fn create(default_summary: bool, options: FormattingOptions) -> Box<dyn SummaryHandler> {
        if default_summary {
            Box::new(DefaultSummary::new(options))
        } else {
            Box::new(P95Report::new(options))
        }
    }
}
