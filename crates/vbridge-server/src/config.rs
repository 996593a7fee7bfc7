use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use vbridge_core::BridgeConfig;
use vbridge_observe::LoggerConfig;
use vbridge_registry::HttpRegistryConfig;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "VBRIDGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Model name reported by `/api/v1/models`.
    pub model: String,
    pub max_alerts: usize,
    pub request_timeout_ms: u64,
    /// Age after which housekeeping drops a pending entry; defaults to the request timeout.
    pub cleanup_horizon_ms: Option<u64>,
    pub sweep_interval_ms: u64,
    /// `0` means unbounded.
    pub queue_capacity: usize,
    /// Stream service base URL; streams are kept in memory when unset.
    pub registry_endpoint: Option<String>,
    pub registry_timeout_ms: u64,
    pub logger: LoggerConfig,
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            model: "vila".to_string(),
            max_alerts: 10,
            request_timeout_ms: 180_000,
            cleanup_horizon_ms: None,
            sweep_interval_ms: 10_000,
            queue_capacity: 0,
            registry_endpoint: None,
            registry_timeout_ms: 10_000,
            logger: LoggerConfig::default(),
            metrics: true,
        }
    }
}

impl ServerConfig {
    /// Load from the file named by [`CONFIG_ENV`], or defaults when it is unset.
    ///
    /// The result is always validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::read(Path::new(&path))?,
            None => Self::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg = Self::read(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be > 0".into()));
        }
        if self.sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid("sweep_interval_ms must be > 0".into()));
        }
        if let Some(horizon) = self.cleanup_horizon_ms {
            if horizon < self.request_timeout_ms {
                return Err(ConfigError::Invalid(format!(
                    "cleanup_horizon_ms ({horizon}) must be >= request_timeout_ms ({})",
                    self.request_timeout_ms
                )));
            }
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model cannot be empty".into()));
        }
        if let Some(endpoint) = &self.registry_endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "registry_endpoint must be an http(s) URL, got {endpoint:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            model: self.model.clone(),
            max_alerts: self.max_alerts,
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn registry_config(&self) -> Option<HttpRegistryConfig> {
        self.registry_endpoint.as_ref().map(|endpoint| HttpRegistryConfig {
            endpoint: endpoint.clone(),
            timeout_ms: self.registry_timeout_ms,
        })
    }

    pub fn cleanup_horizon(&self) -> Duration {
        Duration::from_millis(self.cleanup_horizon_ms.unwrap_or(self.request_timeout_ms))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbridge_observe::LoggerFormat;

    fn parse(raw: &str) -> ServerConfig {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn empty_object_is_defaults() {
        let cfg = parse("{}");
        assert_eq!(cfg.port, 5000);
        assert_eq!(cfg.model, "vila");
        assert_eq!(cfg.max_alerts, 10);
        assert_eq!(cfg.cleanup_horizon(), Duration::from_secs(180));
        assert_eq!(cfg.sweep_interval(), Duration::from_secs(10));
        assert!(cfg.registry_config().is_none());
        assert!(cfg.metrics);
        cfg.validate().unwrap();
    }

    #[test]
    fn overrides_flow_into_component_configs() {
        let cfg = parse(
            r#"{
                "port": 8080,
                "model": "vila-1.5",
                "request_timeout_ms": 5000,
                "registry_endpoint": "http://localhost:5010",
                "logger": {"format": "json", "level": "debug"}
            }"#,
        );
        let bridge = cfg.bridge_config();
        assert_eq!(bridge.model, "vila-1.5");
        assert_eq!(bridge.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.cleanup_horizon(), Duration::from_secs(5));

        let registry = cfg.registry_config().unwrap();
        assert_eq!(registry.endpoint, "http://localhost:5010");
        assert_eq!(registry.timeout_ms, 10_000);

        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.logger.level, "debug");
    }

    #[test]
    fn rejects_unusable_values() {
        let cases = [
            r#"{"request_timeout_ms": 0}"#,
            r#"{"sweep_interval_ms": 0}"#,
            r#"{"model": "  "}"#,
            r#"{"registry_endpoint": "localhost:5010"}"#,
            r#"{"cleanup_horizon_ms": 5000}"#,
            r#"{"request_timeout_ms": 10000, "cleanup_horizon_ms": 9999}"#,
        ];
        for raw in cases {
            assert!(
                matches!(parse(raw).validate(), Err(ConfigError::Invalid(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn horizon_at_or_beyond_timeout_is_accepted() {
        parse(r#"{"request_timeout_ms": 10000, "cleanup_horizon_ms": 10000}"#)
            .validate()
            .unwrap();
        parse(r#"{"cleanup_horizon_ms": 600000}"#).validate().unwrap();
    }

    #[test]
    fn from_env_without_variable_is_validated_defaults() {
        if std::env::var_os(CONFIG_ENV).is_none() {
            let cfg = ServerConfig::from_env().unwrap();
            assert_eq!(cfg.port, 5000);
            assert_eq!(cfg.cleanup_horizon(), cfg.bridge_config().request_timeout);
        }
    }

    #[test]
    fn load_validates_file_contents() {
        let path = std::env::temp_dir().join(format!(
            "vbridge-config-short-horizon-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"cleanup_horizon_ms": 1000}"#).unwrap();
        let err = ServerConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("cleanup_horizon_ms")));
    }

    #[test]
    fn load_reports_path_on_failure() {
        let path = std::env::temp_dir().join(format!("vbridge-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = ServerConfig::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("vbridge-config-"));

        let missing = ServerConfig::load(Path::new("/nonexistent/vbridge.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
