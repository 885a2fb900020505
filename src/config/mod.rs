//! Configuration management module

pub mod env;
pub mod parser;

// Re-export main functionality
pub use env::EnvManager;
pub use parser::{
    display_config_summary, display_server_summary, load_probe_config, load_server_config,
    ConfigParser,
};

// Re-export from models for convenience
pub use crate::models::{ProbeConfig, ServerConfig};
