//! Configuration data models and validation

use crate::logging::LogSettings;
use crate::types::{AppError, Result, Target};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Health-check server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on (0 picks an ephemeral port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Region advertised in the region header, if any
    #[serde(default)]
    pub region: Option<String>,

    /// Emit request timing headers on every response
    #[serde(default)]
    pub timing_headers: bool,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            region: None,
            timing_headers: false,
            enable_color: default_enable_color(),
            json_logs: false,
            verbose: false,
            debug: false,
        }
    }
}

impl ServerConfig {
    /// Socket address the listener binds to
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.parse()
            .map_err(|e| AppError::config(format!("Invalid server host '{}': {}", self.host, e)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings::from_flags(self.verbose, self.debug, self.enable_color, self.json_logs)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        self.bind_address()?;

        if let Some(region) = &self.region {
            if region.trim().is_empty() {
                return Err(AppError::config("Region cannot be empty when set"));
            }
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.host = host.trim().to_string();
        }

        if let Ok(port) = std::env::var("SERVER_PORT") {
            self.port = port.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid SERVER_PORT value '{}': {}", port, e)))?;
        }

        if let Ok(region) = std::env::var("SERVER_REGION") {
            let region = region.trim();
            if !region.is_empty() {
                self.region = Some(region.to_string());
            }
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Latency probe configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Deployment label shared by all three hostnames
    #[serde(default = "default_subdomain")]
    pub subdomain: String,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[serde(default = "default_base_domain")]
    pub base_domain: String,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Number of concurrent virtual users
    #[serde(default = "default_vus")]
    pub vus: u32,

    /// Iterations executed by each virtual user
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// Explicit URL overrides, mostly for pointing the probe at local servers
    #[serde(default)]
    pub direct_url: Option<String>,
    #[serde(default)]
    pub pocker_url: Option<String>,
    #[serde(default)]
    pub pocker_cf_url: Option<String>,

    /// Also report the proxies' internal p(95) durations
    #[serde(default)]
    pub show_internal: bool,

    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default)]
    pub json_logs: bool,

    #[serde(default)]
    pub verbose: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            subdomain: default_subdomain(),
            scheme: default_scheme(),
            base_domain: default_base_domain(),
            health_path: default_health_path(),
            vus: default_vus(),
            iterations: default_iterations(),
            timeout_seconds: default_timeout_secs(),
            direct_url: None,
            pocker_url: None,
            pocker_cf_url: None,
            show_internal: false,
            enable_color: default_enable_color(),
            json_logs: false,
            verbose: false,
            debug: false,
        }
    }
}

impl ProbeConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Total iterations across all virtual users
    pub fn total_iterations(&self) -> u64 {
        self.vus as u64 * self.iterations as u64
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings::from_flags(self.verbose, self.debug, self.enable_color, self.json_logs)
    }

    fn url_override(&self, target: Target) -> Option<&str> {
        match target {
            Target::Direct => self.direct_url.as_deref(),
            Target::Pocker => self.pocker_url.as_deref(),
            Target::PockerCf => self.pocker_cf_url.as_deref(),
        }
    }

    /// URL probed for a target: the override if set, otherwise
    /// `{scheme}://{subdomain}.[{infix}.]{base_domain}{health_path}`
    pub fn target_url(&self, target: Target) -> String {
        if let Some(url) = self.url_override(target) {
            return url.to_string();
        }

        let host = match target.host_infix() {
            Some(infix) => format!("{}.{}.{}", self.subdomain, infix, self.base_domain),
            None => format!("{}.{}", self.subdomain, self.base_domain),
        };
        format!("{}://{}{}", self.scheme, host, self.health_path)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.subdomain.is_empty() {
            return Err(AppError::config("Subdomain cannot be empty"));
        }

        if !self.subdomain.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            || self.subdomain.starts_with('-')
            || self.subdomain.ends_with('-')
        {
            return Err(AppError::config(format!("Invalid subdomain label: {}", self.subdomain)));
        }

        if self.scheme != "http" && self.scheme != "https" {
            return Err(AppError::config(format!("Scheme must be http or https, got: {}", self.scheme)));
        }

        if self.base_domain.is_empty() {
            return Err(AppError::config("Base domain cannot be empty"));
        }

        if !self.health_path.starts_with('/') {
            return Err(AppError::config(format!("Health path must start with '/': {}", self.health_path)));
        }

        for target in Target::ALL {
            let url = self.target_url(target);
            let parsed = url::Url::parse(&url)
                .map_err(|e| AppError::config(format!("Invalid {} URL '{}': {}", target, url, e)))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(AppError::config(format!("Unsupported scheme for {} URL: {}", target, url)));
            }
        }

        if self.vus == 0 {
            return Err(AppError::config("Virtual users must be greater than 0"));
        }

        if self.vus > 1000 {
            return Err(AppError::config("Virtual users cannot exceed 1000"));
        }

        if self.iterations == 0 {
            return Err(AppError::config("Iterations must be greater than 0"));
        }

        if self.iterations > 100_000 {
            return Err(AppError::config("Iterations cannot exceed 100000"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(subdomain) = std::env::var("PROBE_SUBDOMAIN") {
            self.subdomain = subdomain.trim().to_string();
        }

        if let Ok(scheme) = std::env::var("PROBE_SCHEME") {
            self.scheme = scheme.trim().to_lowercase();
        }

        if let Ok(base_domain) = std::env::var("PROBE_BASE_DOMAIN") {
            self.base_domain = base_domain.trim().to_string();
        }

        if let Ok(vus) = std::env::var("PROBE_VUS") {
            self.vus = vus.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PROBE_VUS value '{}': {}", vus, e)))?;
        }

        if let Ok(iterations) = std::env::var("PROBE_ITERATIONS") {
            self.iterations = iterations.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PROBE_ITERATIONS value '{}': {}", iterations, e)))?;
        }

        if let Ok(timeout) = std::env::var("PROBE_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PROBE_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_host() -> String {
    crate::defaults::DEFAULT_SERVER_HOST.to_string()
}

fn default_port() -> u16 {
    crate::defaults::DEFAULT_SERVER_PORT
}

fn default_subdomain() -> String {
    crate::defaults::DEFAULT_SUBDOMAIN.to_string()
}

fn default_scheme() -> String {
    crate::defaults::DEFAULT_SCHEME.to_string()
}

fn default_base_domain() -> String {
    crate::defaults::DEFAULT_BASE_DOMAIN.to_string()
}

fn default_health_path() -> String {
    crate::defaults::DEFAULT_HEALTH_PATH.to_string()
}

fn default_vus() -> u32 {
    crate::defaults::DEFAULT_VUS
}

fn default_iterations() -> u32 {
    crate::defaults::DEFAULT_ITERATIONS
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
