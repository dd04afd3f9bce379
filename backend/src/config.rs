//! Configuration management for the agricultural monitoring server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with AGRO_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Sentinel Hub imagery provider configuration
    pub sentinel_hub: SentinelHubConfig,

    /// NDVI pipeline tuning
    pub ndvi: NdviConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SentinelHubConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Services base URL (Process API lives under /api/v1/process)
    pub base_url: String,

    /// OAuth token endpoint
    pub token_url: String,

    /// Data collection identifier
    pub data_collection: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NdviConfig {
    /// Half-width in degrees used to expand a point request
    pub point_margin_deg: f64,

    /// Half-width in degrees of each history sample box
    pub history_margin_deg: f64,

    /// Ground resolution in meters per pixel
    pub resolution_m: f64,

    /// Largest width or height requested from the provider
    pub max_dimension: u32,

    /// History samples fetched from the provider at the same time
    pub history_concurrency: usize,
}

impl Default for NdviConfig {
    fn default() -> Self {
        Self {
            point_margin_deg: 0.01,
            history_margin_deg: 0.005,
            resolution_m: 10.0,
            max_dimension: 2500,
            history_concurrency: 4,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("AGRO_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("sentinel_hub.client_id", "")?
            .set_default("sentinel_hub.client_secret", "")?
            .set_default("sentinel_hub.base_url", "https://services.sentinel-hub.com")?
            .set_default(
                "sentinel_hub.token_url",
                "https://services.sentinel-hub.com/auth/realms/main/protocol/openid-connect/token",
            )?
            .set_default("sentinel_hub.data_collection", "sentinel-2-l2a")?
            .set_default("sentinel_hub.timeout_secs", 60)?
            .set_default("ndvi.point_margin_deg", 0.01)?
            .set_default("ndvi.history_margin_deg", 0.005)?
            .set_default("ndvi.resolution_m", 10.0)?
            .set_default("ndvi.max_dimension", 2500)?
            .set_default("ndvi.history_concurrency", 4)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRO_ prefix)
            .add_source(
                Environment::with_prefix("AGRO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
