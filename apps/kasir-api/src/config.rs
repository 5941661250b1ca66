//! # API Configuration
//!
//! Settings come from built-in defaults overridden by `KASIR_*` environment
//! variables. `main` loads a `.env` file (if any) into the environment first.
//!
//! | Variable                | Default       |
//! |-------------------------|---------------|
//! | `KASIR_HOST`            | `127.0.0.1`   |
//! | `KASIR_PORT`            | `8080`        |
//! | `KASIR_DATABASE_PATH`   | `kasir.db`    |
//! | `KASIR_MAX_CONNECTIONS` | `5`           |

use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::lookup_host;

use kasir_db::DbConfig;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind: an IP address or a host name such as `localhost`.
    pub host: String,

    /// TCP port to bind.
    pub port: u16,

    /// SQLite database file.
    pub database_path: PathBuf,

    /// Connection pool size.
    pub max_connections: u32,
}

impl ApiConfig {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::with_prefix("KASIR"))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_path", "kasir.db")?
            .set_default("max_connections", 5)?
            .add_source(env.try_parsing(true))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "KASIR_MAX_CONNECTIONS".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "KASIR_HOST".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Resolves `host:port` to the address the listener binds to.
    ///
    /// Host names are resolved; the first address returned wins.
    pub async fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let unresolved = |reason: String| ConfigError::InvalidValue {
            key: "KASIR_HOST".to_string(),
            reason,
        };

        lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| unresolved(format!("cannot resolve '{}': {}", self.host, e)))?
            .next()
            .ok_or_else(|| unresolved(format!("'{}' resolved to no address", self.host)))
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_from(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        ApiConfig::from_environment(Environment::with_prefix("KASIR").source(Some(source)))
    }

    #[tokio::test]
    async fn test_defaults() {
        let config = load_from(&[]).unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, PathBuf::from("kasir.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.bind_addr().await.unwrap().to_string(), "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_environment_overrides() {
        let config = load_from(&[
            ("KASIR_HOST", "0.0.0.0"),
            ("KASIR_PORT", "9000"),
            ("KASIR_DATABASE_PATH", "/var/lib/kasir/kasir.db"),
            ("KASIR_MAX_CONNECTIONS", "8"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr().await.unwrap().to_string(), "0.0.0.0:9000");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/kasir/kasir.db"));

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert!(!db.in_memory);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load_from(&[("KASIR_PORT", "not-a-port")]),
            Err(ConfigError::Load(_))
        ));
        assert!(matches!(
            load_from(&[("KASIR_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            load_from(&[("KASIR_HOST", "  ")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_host_name_is_resolved() {
        let config = load_from(&[("KASIR_HOST", "localhost"), ("KASIR_PORT", "8181")]).unwrap();

        let addr = config.bind_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 8181);
    }

    #[tokio::test]
    async fn test_unresolvable_host() {
        let config = load_from(&[("KASIR_HOST", "kasir.invalid")]).unwrap();

        assert!(matches!(
            config.bind_addr().await,
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
