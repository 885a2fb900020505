//! Pocker Health
//!
//! Two small tools for checking a deployment's routing paths:
//! a health-check server that answers every request with `ok`, and a
//! latency probe that drives GET traffic against the direct and proxied
//! hostnames of a deployment and reports 95th-percentile latencies.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod server;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use executor::{IterationOutcome, ProbeExecutor, RunResults};
pub use logging::{LogSink, Logger, MemorySink};
pub use models::{MetricsRegistry, ProbeConfig, ServerConfig, SummaryData, TrendValues};
pub use output::{DefaultSummary, P95Report, SummaryHandler, SummaryOutput};
pub use server::{BoundServer, HealthServer, ServerState};
pub use types::Target;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");

/// One-line build description used in debug banners
pub fn build_info() -> String {
    format!("{} v{} ({}, built {})", PKG_NAME, VERSION, GIT_COMMIT, BUILD_TIME)
}

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_SERVER_HOST: &str = "::";
    pub const DEFAULT_SERVER_PORT: u16 = 8080;

    pub const DEFAULT_SUBDOMAIN: &str = "continent-powerful";
    pub const DEFAULT_SCHEME: &str = "https";
    pub const DEFAULT_BASE_DOMAIN: &str = "pockethost.io";
    pub const DEFAULT_HEALTH_PATH: &str = "/api/health";
    pub const DEFAULT_VUS: u32 = 10;
    pub const DEFAULT_ITERATIONS: u32 = 100;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const REGION_HEADER: &str = "X-Pockethost-Region";
    pub const REQUEST_DURATION_HEADER: &str = "X-Pockethost-Request-Duration";
}
