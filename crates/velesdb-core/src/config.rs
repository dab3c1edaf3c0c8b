//! Service configuration: CLI flags and environment variables, layered
//! over compiled-in defaults via `figment`.
//!
//! Priority (highest to lowest): CLI flags merged in by the caller >
//! environment variables (`VECTOR_*`) > defaults. No `Toml` layer, since
//! this service takes no config file.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Errors produced while assembling [`ServiceConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `figment` failed to merge or extract the configuration.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// gRPC port; accepted for compatibility but not currently served.
    pub port: u16,
    /// HTTP port the JSON API listens on.
    pub http_port: u16,
    /// Directory collections persist their config and binary files to.
    pub data_dir: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: 50051,
            http_port: 50052,
            data_dir: "./data".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from defaults overridden by `VECTOR_*` environment
    /// variables, then by the explicit CLI overrides in `cli`.
    pub fn load(cli: CliOverrides) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed("VECTOR_"))
            .merge(Serialized::defaults(cli.into_partial()));

        figment.extract().map_err(|e| ConfigError::Load(e.to_string()))
    }
}

/// CLI-supplied overrides, applied after environment variables so explicit
/// flags win over both defaults and env (`--http-port` beats `VECTOR_HTTP_PORT`).
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--port`.
    pub port: Option<u16>,
    /// `--http-port`.
    pub http_port: Option<u16>,
    /// `--data`.
    pub data_dir: Option<String>,
}

impl CliOverrides {
    fn into_partial(self) -> PartialConfig {
        PartialConfig {
            port: self.port,
            http_port: self.http_port,
            data_dir: self.data_dir,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
struct PartialConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    http_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_dir: Option<String>,
}
