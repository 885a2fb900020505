//! Command-line interfaces for the latency probe and the health server

use clap::Parser;

/// Latency probe comparing direct and proxied routes to a deployment's health endpoint
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "latency-probe")]
#[command(version, about, long_about = None)]
pub struct ProbeCli {
    /// Deployment subdomain shared by all three hostnames
    #[arg(short, long)]
    pub subdomain: Option<String>,

    /// Number of concurrent virtual users
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub vus: Option<u32>,

    /// Iterations executed by each virtual user
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    pub iterations: Option<u32>,

    /// Request timeout in seconds
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<u64>,

    /// Base domain the hostnames are built under
    #[arg(long)]
    pub base_domain: Option<String>,

    /// URL scheme (http or https)
    #[arg(long, value_parser = ["http", "https"])]
    pub scheme: Option<String>,

    /// Replace the direct URL entirely
    #[arg(long, value_name = "URL")]
    pub direct_url: Option<String>,

    /// Replace the edge-proxy URL entirely
    #[arg(long, value_name = "URL")]
    pub pocker_url: Option<String>,

    /// Replace the CDN plus edge-proxy URL entirely
    #[arg(long, value_name = "URL")]
    pub pocker_cf_url: Option<String>,

    /// Also report the proxies' internal p(95) durations
    #[arg(long)]
    pub show_internal: bool,

    /// Print the full trend table instead of the p(95) report
    #[arg(long)]
    pub default_summary: bool,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Validate .env and environment variables, then exit
    #[arg(long)]
    pub check_env: bool,

    /// List supported environment variables, then exit
    #[arg(long)]
    pub env_help: bool,
}

impl ProbeCli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        color_choice(self.color, self.no_color)
    }

    /// URL overrides given on the command line
    pub fn url_overrides(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("--direct-url", self.direct_url.as_deref()),
            ("--pocker-url", self.pocker_url.as_deref()),
            ("--pocker-cf-url", self.pocker_cf_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(flag, url)| url.map(|u| (flag, u)))
    }
}

/// Health-check HTTP server answering every request with `ok`
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "health-server")]
#[command(version, about, long_about = None)]
pub struct ServerCli {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Region reported in the region header
    #[arg(long)]
    pub region: Option<String>,

    /// Add request duration and region headers to every response
    #[arg(long)]
    pub timing_headers: bool,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Emit log lines as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Validate .env and environment variables, then exit
    #[arg(long)]
    pub check_env: bool,

    /// List supported environment variables, then exit
    #[arg(long)]
    pub env_help: bool,
}

impl ServerCli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        color_choice(self.color, self.no_color)
    }
}

fn color_choice(force: bool, disable: bool) -> bool {
    if force {
        true
    } else if disable {
        false
    } else {
        supports_color()
    }
}

/// Parse duration from seconds string
fn parse_duration(s: &str) -> Result<u64, String> {
    // Reject strings with leading + sign or other invalid formats
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    // Default to true on Unix-like systems, false on Windows
    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}
