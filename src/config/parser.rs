//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{ProbeCli, ServerCli},
    config::env::EnvManager,
    error::Result,
    models::{ProbeConfig, ServerConfig},
    types::Target,
};

/// Configuration parser that combines CLI arguments with environment variables.
///
/// Layers, lowest priority first: defaults, `.env`, process environment,
/// command line. The merged result is validated before it is returned.
pub struct ConfigParser<C> {
    cli: C,
}

impl<C> ConfigParser<C> {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: C) -> Self {
        Self { cli }
    }
}

impl ConfigParser<ProbeCli> {
    /// Parse and build the complete probe configuration
    pub fn parse(&self) -> Result<ProbeConfig> {
        let mut config = ProbeConfig::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut ProbeConfig) {
        let cli = &self.cli;

        if let Some(subdomain) = &cli.subdomain {
            config.subdomain = subdomain.trim().to_string();
        }
        if let Some(scheme) = &cli.scheme {
            config.scheme = scheme.clone();
        }
        if let Some(base_domain) = &cli.base_domain {
            config.base_domain = base_domain.trim().to_string();
        }
        if let Some(vus) = cli.vus {
            config.vus = vus;
        }
        if let Some(iterations) = cli.iterations {
            config.iterations = iterations;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_seconds = timeout;
        }

        if cli.direct_url.is_some() {
            config.direct_url = cli.direct_url.clone();
        }
        if cli.pocker_url.is_some() {
            config.pocker_url = cli.pocker_url.clone();
        }
        if cli.pocker_cf_url.is_some() {
            config.pocker_cf_url = cli.pocker_cf_url.clone();
        }

        if cli.color {
            config.enable_color = true;
        } else if cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.show_internal = cli.show_internal;
        config.json_logs = cli.json_logs;
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: vus={}, iterations={}, timeout={}s, enable_color={}",
                config.vus, config.iterations, config.timeout_seconds, config.enable_color
            );
        }
    }
}

impl ConfigParser<ServerCli> {
    /// Parse and build the complete server configuration
    pub fn parse(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::default();

        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut ServerConfig) {
        let cli = &self.cli;

        if let Some(host) = &cli.host {
            config.host = host.trim().to_string();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        if let Some(region) = &cli.region {
            config.region = Some(region.trim().to_string());
        }
        if cli.timing_headers {
            config.timing_headers = true;
        }

        if cli.color {
            config.enable_color = true;
        } else if cli.no_color {
            config.enable_color = false;
        }

        config.json_logs = cli.json_logs;
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Convenience function to load the probe configuration from CLI arguments
pub fn load_probe_config(cli: ProbeCli) -> Result<ProbeConfig> {
    ConfigParser::new(cli).parse()
}

/// Convenience function to load the server configuration from CLI arguments
pub fn load_server_config(cli: ServerCli) -> Result<ServerConfig> {
    ConfigParser::new(cli).parse()
}

/// Display probe configuration summary for debug purposes
pub fn display_config_summary(config: &ProbeConfig) -> String {
    let mut summary = Vec::new();

    for target in Target::ALL {
        summary.push(format!("{} URL: {}", target, config.target_url(target)));
    }
    summary.push(format!("Virtual Users: {}", config.vus));
    summary.push(format!("Iterations per VU: {}", config.iterations));
    summary.push(format!("Total Iterations: {}", config.total_iterations()));
    summary.push(format!("Timeout: {}s", config.timeout_seconds));
    summary.push(format!("Show Internal: {}", config.show_internal));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}

/// Display server configuration summary for debug purposes
pub fn display_server_summary(config: &ServerConfig) -> String {
    let mut summary = Vec::new();

    match config.bind_address() {
        Ok(addr) => summary.push(format!("Bind Address: {}", addr)),
        Err(_) => summary.push(format!("Bind Address: {}:{} (invalid)", config.host, config.port)),
    }
    summary.push(format!("Region: {}", config.region.as_deref().unwrap_or("<unset>")));
    summary.push(format!("Timing Headers: {}", config.timing_headers));
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
