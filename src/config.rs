//! Application configuration using Figment.
//!
//! Configuration is loaded from:
//! 1. `nml-client.toml` (base configuration, optional)
//! 2. Environment variables (prefixed with `NML_`)
//!
//! Every field has a default, so the client starts with no config file at all.
//!
//! # Example
//! ```no_run
//! use nml_client::config::AppConfig;
//!
//! let config = AppConfig::load().unwrap();
//! println!("Application: {}", config.application.name);
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application settings
    #[serde(default)]
    pub application: ApplicationConfig,
    /// Computation server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Local persisted-state settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Version strings shown on the About page
    #[serde(default)]
    pub versions: VersionConfig,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    pub name: String,
    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Computation server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API base URL used when no URL has been persisted yet
    pub default_api_url: String,
    /// UI-pacing delay applied before opening the health socket, in milliseconds.
    /// Purposefully slows the app down so state transitions are visible.
    pub connection_delay_ms: u64,
    /// UI-pacing delay applied to every calculation result, in milliseconds.
    /// Applied to success and error paths alike so perceived latency is uniform.
    pub calculation_delay_ms: u64,
}

/// Local persisted-state configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the persisted key/value store.
    /// Defaults to the platform data dir when absent.
    pub dir: Option<PathBuf>,
}

/// Version strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    pub client: String,
    pub api: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "Numerical Methods Labs".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            default_api_url: "http://localhost:8000/api".to_string(),
            connection_delay_ms: 300,
            calculation_delay_ms: 300,
        }
    }
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            client: "1.1.0".to_string(),
            api: "1.1.0".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig::default(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            versions: VersionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `nml-client.toml` and environment variables.
    ///
    /// Environment variables can override configuration with prefix `NML_`.
    /// Example: `NML_APPLICATION_LOG_LEVEL=debug`
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from("nml-client.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("NML_").split("_"))
            .extract()
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            ));
        }

        if !self.server.default_api_url.starts_with("http://")
            && !self.server.default_api_url.starts_with("https://")
        {
            return Err(format!(
                "Invalid default_api_url '{}'. Must start with http:// or https://",
                self.server.default_api_url
            ));
        }

        // Pacing delays above 10s would make the client feel broken.
        if self.server.connection_delay_ms > 10_000 || self.server.calculation_delay_ms > 10_000 {
            return Err("Pacing delays must be at most 10000 ms".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_config_file() {
        let config = AppConfig::load_from("does-not-exist.toml").unwrap();
        assert_eq!(config.server.default_api_url, "http://localhost:8000/api");
        assert_eq!(config.server.connection_delay_ms, 300);
        assert_eq!(config.server.calculation_delay_ms, 300);
        assert_eq!(config.versions.client, "1.1.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_log_level_fails_validation() {
        let mut config = AppConfig::default();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_api_url_fails_validation() {
        let mut config = AppConfig::default();
        config.server.default_api_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nml-client.toml");
        std::fs::write(
            &path,
            "[server]\ndefault_api_url = \"http://numerics.example:9000/api\"\ncalculation_delay_ms = 50\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(
            config.server.default_api_url,
            "http://numerics.example:9000/api"
        );
        assert_eq!(config.server.calculation_delay_ms, 50);
        // Untouched sections keep their defaults.
        assert_eq!(config.server.connection_delay_ms, 300);
    }
}
