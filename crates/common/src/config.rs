//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Admin/moderation configuration.
    pub admin: AdminConfig,
    /// Voting configuration.
    #[serde(default)]
    pub voting: VotingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

impl ServerConfig {
    /// Address the listener binds to, `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Admin configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Shared secret required in the `x-admin-secret` header for moderation
    /// endpoints. Admin endpoints refuse all requests when unset.
    #[serde(default)]
    pub secret: Option<String>,
}

/// Voting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VotingConfig {
    /// Whether votes may be cast on soft-deleted research and comments.
    #[serde(default)]
    pub allow_on_deleted: bool,
    /// Maximum internal retries when a concurrent vote on the same entity
    /// causes a write conflict.
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            allow_on_deleted: false,
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_max_conflict_retries() -> u32 {
    3
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `SCISYNC_ENV`)
    /// 3. Environment variables with `SCISYNC_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("SCISYNC_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SCISYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SCISYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voting_config_defaults() {
        let voting = VotingConfig::default();
        assert!(!voting.allow_on_deleted);
        assert_eq!(voting.max_conflict_retries, 3);
    }

    #[test]
    fn test_server_bind_addr_uses_configured_host() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            url: "http://localhost:8080".to_string(),
        };
        assert_eq!(server.bind_addr(), "127.0.0.1:8080");
    }
}
