//! Service configuration.
//!
//! Layers, lowest to highest: built-in defaults, optional TOML file,
//! `PRICEGRID__*` environment variables. CLI flags are applied on top by the
//! binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::types::{GridPolicy, DEFAULT_FILL};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub grid: GridConfig,
    pub cors: CorsConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// JSON seed file; the built-in seed is used when unset
    pub seed_path: Option<PathBuf>,
    pub default_fill: f64,
    /// Reject appended rows/columns whose label is already on the axis
    pub unique_labels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `*` allows any origin
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_filter: String,
    pub metrics_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { seed_path: None, default_fill: DEFAULT_FILL, unique_labels: true }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: vec!["*".to_string()] }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: "pricegrid_rs=info,pricegrid=info,tower_http=info".to_string(),
            metrics_port: 9000,
        }
    }
}

impl AppConfig {
    /// Load from an optional file plus the environment. A missing file is not an error.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PRICEGRID")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("invalid configuration")
    }

    #[must_use]
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn policy(&self) -> GridPolicy {
        GridPolicy {
            default_fill: self.grid.default_fill,
            unique_labels: self.grid.unique_labels,
        }
    }
}
