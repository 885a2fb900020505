//! Data models for configuration and collected metrics

pub mod config;
pub mod metrics;

// Re-export main model types
pub use config::{ProbeConfig, ServerConfig};
pub use metrics::{MetricsRegistry, SummaryData, TrendValues};
