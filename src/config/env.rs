//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file from the current directory if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load the given env file if it exists. Variables already set in the
    /// process environment are left untouched.
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                println!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            println!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Pocker Health Configuration
#
# Values here act as defaults and are overridden by real environment
# variables and command-line arguments.

# Deployment subdomain probed under the base domain
# PROBE_SUBDOMAIN=continent-powerful

# URL scheme and base domain for the three hostnames
# PROBE_SCHEME=https
# PROBE_BASE_DOMAIN=pockethost.io

# Concurrent virtual users and iterations per user
# PROBE_VUS=10
# PROBE_ITERATIONS=100

# Request timeout in seconds
# PROBE_TIMEOUT_SECONDS=30

# Health server bind address and port
# SERVER_HOST=::
# SERVER_PORT=8080

# Region reported by the health server when timing headers are on
# SERVER_REGION=sjc

# Enable colored output (true/false)
# ENABLE_COLOR=true
"#
        .to_string()
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "PROBE_SUBDOMAIN" => {
                let value = value.trim();
                if value.is_empty()
                    || value.starts_with('-')
                    || value.ends_with('-')
                    || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
                {
                    return Err(AppError::config(format!("Invalid PROBE_SUBDOMAIN value '{}'", value)));
                }
            }
            "PROBE_SCHEME" => {
                let scheme = value.trim().to_lowercase();
                if scheme != "http" && scheme != "https" {
                    return Err(AppError::config(format!("PROBE_SCHEME must be http or https, got: {}", value)));
                }
            }
            "PROBE_BASE_DOMAIN" => {
                let domain = value.trim();
                url::Url::parse(&format!("https://{}/", domain))
                    .map_err(|e| AppError::config(format!("Invalid PROBE_BASE_DOMAIN value '{}': {}", domain, e)))?;
            }
            "PROBE_VUS" => {
                let vus: u32 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid PROBE_VUS value '{}': {}", value, e)))?;
                if vus == 0 || vus > 1000 {
                    return Err(AppError::config(format!("PROBE_VUS must be between 1 and 1000, got: {}", vus)));
                }
            }
            "PROBE_ITERATIONS" => {
                let iterations: u32 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid PROBE_ITERATIONS value '{}': {}", value, e)))?;
                if iterations == 0 || iterations > 100_000 {
                    return Err(AppError::config(format!("PROBE_ITERATIONS must be between 1 and 100000, got: {}", iterations)));
                }
            }
            "PROBE_TIMEOUT_SECONDS" => {
                let timeout: u64 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid PROBE_TIMEOUT_SECONDS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > 300 {
                    return Err(AppError::config(format!("PROBE_TIMEOUT_SECONDS must be between 1 and 300, got: {}", timeout)));
                }
            }
            "SERVER_HOST" => {
                value.trim().parse::<std::net::IpAddr>()
                    .map_err(|e| AppError::config(format!("Invalid SERVER_HOST value '{}': {}", value, e)))?;
            }
            "SERVER_PORT" => {
                value.trim().parse::<u16>()
                    .map_err(|e| AppError::config(format!("Invalid SERVER_PORT value '{}': {}", value, e)))?;
            }
            "SERVER_REGION" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("SERVER_REGION cannot be empty"));
                }
            }
            "ENABLE_COLOR" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("PROBE_SUBDOMAIN", "Deployment subdomain to probe", "continent-powerful"),
            ("PROBE_SCHEME", "URL scheme (http or https)", "https"),
            ("PROBE_BASE_DOMAIN", "Base domain for the probed hostnames", "pockethost.io"),
            ("PROBE_VUS", "Concurrent virtual users (1-1000)", "10"),
            ("PROBE_ITERATIONS", "Iterations per virtual user (1-100000)", "100"),
            ("PROBE_TIMEOUT_SECONDS", "Request timeout in seconds (1-300)", "30"),
            ("SERVER_HOST", "Health server bind address", "::"),
            ("SERVER_PORT", "Health server port", "8080"),
            ("SERVER_REGION", "Region reported by the health server", "sjc"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n\n");

        help.push_str("Example .env file:\n\n");
        help.push_str(&Self::create_example_env_content());

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(format!("Warning: {}", e));
                }
            }
        }

        warnings
    }

    /// Validate the assignments in an env file without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                if let Err(e) = Self::validate_env_var(key, value) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }

    /// Check `env_file` and the current process environment without loading
    /// anything. Any invalid value is a validation error listing every problem.
    pub fn check_environment(env_file: &Path) -> Result<String> {
        let mut problems = Vec::new();
        let mut report = String::new();

        match Self::check_env_file(env_file)? {
            Some(warnings) => {
                report.push_str(&format!("{}: {} invalid value(s)\n", env_file.display(), warnings.len()));
                problems.extend(warnings);
            }
            None => report.push_str(&format!("{}: not found\n", env_file.display())),
        }

        let env_warnings = Self::validate_current_env();
        report.push_str(&format!("Process environment: {} invalid value(s)\n", env_warnings.len()));
        problems.extend(env_warnings);

        if problems.is_empty() {
            Ok(report)
        } else {
            Err(AppError::validation(problems.join("\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();

        for (var, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", var)), "missing {}", var);
        }
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("PROBE_SUBDOMAIN", "continent-powerful").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_SCHEME", "HTTPS").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_BASE_DOMAIN", "pockethost.io").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_VUS", "10").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_ITERATIONS", "100").is_ok());
        assert!(EnvManager::validate_env_var("PROBE_TIMEOUT_SECONDS", "30").is_ok());
        assert!(EnvManager::validate_env_var("SERVER_HOST", "0.0.0.0").is_ok());
        assert!(EnvManager::validate_env_var("SERVER_HOST", "::").is_ok());
        assert!(EnvManager::validate_env_var("SERVER_PORT", "8080").is_ok());
        assert!(EnvManager::validate_env_var("SERVER_REGION", "sjc").is_ok());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("UNRELATED", "anything").is_ok());

        assert!(EnvManager::validate_env_var("PROBE_SUBDOMAIN", "-bad").is_err());
        assert!(EnvManager::validate_env_var("PROBE_SUBDOMAIN", "has.dot").is_err());
        assert!(EnvManager::validate_env_var("PROBE_SCHEME", "ftp").is_err());
        assert!(EnvManager::validate_env_var("PROBE_VUS", "0").is_err());
        assert!(EnvManager::validate_env_var("PROBE_VUS", "1001").is_err());
        assert!(EnvManager::validate_env_var("PROBE_ITERATIONS", "-1").is_err());
        assert!(EnvManager::validate_env_var("PROBE_TIMEOUT_SECONDS", "301").is_err());
        assert!(EnvManager::validate_env_var("SERVER_HOST", "localhost").is_err());
        assert!(EnvManager::validate_env_var("SERVER_PORT", "65536").is_err());
        assert!(EnvManager::validate_env_var("SERVER_REGION", "  ").is_err());
        assert!(EnvManager::validate_env_var("ENABLE_COLOR", "maybe").is_err());
    }

    #[test]
    fn test_check_env_file_reports_bad_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# comment\nPROBE_VUS=4\nSERVER_PORT=notaport\n\nENABLE_COLOR=true\n").unwrap();

        let warnings = EnvManager::check_env_file(&path).unwrap().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("SERVER_PORT=notaport"));
    }

    #[test]
    fn test_check_missing_env_file() {
        let dir = TempDir::new().unwrap();
        assert!(EnvManager::check_env_file(&dir.path().join(".env")).unwrap().is_none());
        assert!(EnvManager::load_env_file_from(&dir.path().join(".env"), false).is_ok());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();

        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("PROBE_SUBDOMAIN"));
        assert!(help.contains("SERVER_PORT"));
        assert!(help.contains("Configuration Priority"));
        assert!(help.contains("# PROBE_VUS=10"));
    }
}
