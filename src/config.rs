//! Application configuration
//!
//! Loaded from a TOML file (`~/.config/subshare-admin/config.toml` by
//! default, override with `SUBSHARE_CONFIG`). Every section has working
//! defaults so the service boots without a config file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub docstore: DocstoreConfig,
    pub security: SecurityConfig,
    pub admin: AdminBootstrap,
    pub logging: LoggingConfig,
    pub monitor: MonitorConfig,
    pub rate_limit: RateLimitConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

/// Relational database settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file path, used when `url` is not set
    pub path: String,
    /// Full connection URL, takes precedence over `path`
    pub url: Option<String>,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: "./subshare.db".to_string(),
            url: None,
        }
    }
}

impl DatabaseSection {
    pub fn connection_url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}?mode=rwc", self.path))
    }
}

/// Document store partitions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocstoreConfig {
    /// Service tags, one partition per tag. The admin-wide documents
    /// (admin config) live in a separate global partition.
    pub services: Vec<String>,
}

impl Default for DocstoreConfig {
    fn default() -> Self {
        Self {
            services: vec![
                "netflix".to_string(),
                "spotify".to_string(),
                "prime".to_string(),
                "youtube".to_string(),
            ],
        }
    }
}

/// Security / JWT settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "super-secret-key-change-in-production".to_string(),
            jwt_expiration_hours: 24,
        }
    }
}

/// Default admin account created on first boot
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminBootstrap {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminBootstrap {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            email: "admin@subshare.local".to_string(),
            password: "admin12345".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter, e.g. "info" or "subshare_admin=debug"
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Expiry monitor settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// How often transactions are swept (seconds)
    pub check_interval_secs: u64,
    /// Rolling window for the expired list (hours)
    pub display_window_hours: i64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            display_window_hours: 24,
        }
    }
}

/// Rate limiting for the auth endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub login_per_second: u64,
    pub login_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_per_second: 2,
            login_burst: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.into(), e))?;
        toml::from_str(&raw).map_err(ConfigError::Parse)
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Default config file location (~/.config/subshare-admin/config.toml)
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("subshare-admin")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.api_port, 8080);
        assert_eq!(cfg.docstore.services.len(), 4);
        assert_eq!(cfg.monitor.display_window_hours, 24);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            api_port = 9999

            [docstore]
            services = ["netflix", "spotify"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.api_port, 9999);
        assert_eq!(cfg.server.api_host, "0.0.0.0");
        assert_eq!(cfg.docstore.services, vec!["netflix", "spotify"]);
        assert_eq!(cfg.security.jwt_expiration_hours, 24);
    }

    #[test]
    fn test_database_url_precedence() {
        let mut db = DatabaseSection::default();
        assert!(db.connection_url().starts_with("sqlite://./subshare.db"));
        db.url = Some("sqlite://custom.db?mode=rwc".to_string());
        assert_eq!(db.connection_url(), "sqlite://custom.db?mode=rwc");
    }
}
