//! Server configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use sim_lib::EngineConfig;
use std::path::Path;

/// Environment variable naming an optional config file
pub const CONFIG_FILE_ENV: &str = "SIM_CONFIG_FILE";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Instance name attached to every log event
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Fixed seed for reproducible series; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Weight tables, range table and generation bands
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_instance_name() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "telemetry-sim".to_string())
}

fn default_api_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            seed: None,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the optional config file and `SIM_*` environment
    pub fn load() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_ENV).ok();
        Self::from_sources(file.as_deref().map(Path::new), true)
    }

    /// Load from an optional file, then (optionally) the environment
    pub fn from_sources(file: Option<&Path>, with_env: bool) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        if with_env {
            builder = builder.add_source(
                config::Environment::with_prefix("SIM")
                    .try_parsing(true)
                    .ignore_empty(true),
            );
        }

        let config: ServerConfig = builder
            .build()
            .context("Failed to read configuration sources")?
            .try_deserialize()
            .context("Failed to parse configuration")?;

        config
            .engine
            .validate()
            .context("Invalid engine configuration")?;

        Ok(config)
    }
}
