//! Configuration management for the Stockyard server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKYARD__ prefix

use std::collections::HashMap;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{Permission, PermissionTable, LOW_STOCK_THRESHOLD};

/// Secret used only when running in development
pub const DEVELOPMENT_JWT_SECRET: &str = "development-secret-key";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Bearer token verification
    pub auth: AuthConfig,

    /// Stock thresholds
    pub inventory: InventoryConfig,

    /// Alert behaviour
    pub alerts: AlertConfig,

    /// Log output
    pub log: LogConfig,

    /// Per-role permission overrides, keyed by role name
    #[serde(default)]
    pub permissions: HashMap<String, Vec<Permission>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,

    /// Apply pending migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// When false every request runs as an anonymous admin
    pub enabled: bool,

    /// HMAC secret used to verify access tokens; no default outside development
    #[serde(default)]
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InventoryConfig {
    /// Aggregate quantity below which an item raises a low-stock alert
    pub low_stock_threshold: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertConfig {
    /// Settle an item's low-stock alert when a stock request for it is
    /// submitted and stock is already sufficient
    pub settle_on_request_submission: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// `pretty` or `json`
    pub format: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKYARD_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_development = environment == "development";

        let mut builder = config::Config::builder();
        if is_development {
            builder = builder.set_default("auth.jwt_secret", DEVELOPMENT_JWT_SECRET)?;
        }

        let config = builder
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/stockyard")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.run_migrations", is_development)?
            .set_default("auth.enabled", !is_development)?
            .set_default("inventory.low_stock_threshold", LOW_STOCK_THRESHOLD)?
            .set_default("alerts.settle_on_request_submission", true)?
            .set_default("log.format", "pretty")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKYARD__ prefix)
            .add_source(
                Environment::with_prefix("STOCKYARD")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the workflow misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inventory.low_stock_threshold < 0 {
            return Err(ConfigError::Message(
                "inventory.low_stock_threshold must not be negative".into(),
            ));
        }
        if self.auth.enabled && self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.jwt_secret is required when auth is enabled".into(),
            ));
        }
        if !self.is_development() && self.auth.jwt_secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigError::Message(
                "auth.jwt_secret must be set outside development".into(),
            ));
        }
        Ok(())
    }

    /// Build the role → permission table from defaults plus overrides
    pub fn permission_table(&self) -> Result<PermissionTable, ConfigError> {
        PermissionTable::with_overrides(&self.permissions)
            .map_err(|e| ConfigError::Message(format!("permissions: {}", e)))
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/stockyard".to_string(),
                max_connections: 10,
                min_connections: 2,
                acquire_timeout_secs: 30,
                run_migrations: true,
            },
            auth: AuthConfig {
                enabled: false,
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            },
            inventory: InventoryConfig {
                low_stock_threshold: LOW_STOCK_THRESHOLD,
            },
            alerts: AlertConfig {
                settle_on_request_submission: true,
            },
            log: LogConfig {
                format: "pretty".to_string(),
            },
            permissions: HashMap::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
