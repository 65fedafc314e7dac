//! Service configuration
//!
//! Hard defaults, overridden by an optional YAML file named through
//! `CONFIG_PATH`, overridden in turn by `SALESDASH_*` environment
//! variables. Validation runs last and aborts startup on nonsense.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Dataset ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// CSV file the dataset is loaded from at startup
    pub csv_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/shopify.csv".to_string(),
        }
    }
}

/// Authentication settings for the single configured user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// Token lifetime in minutes
    pub token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
            token_ttl_minutes: 30,
        }
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
    pub data: DataConfig,
    pub auth: AuthConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            data: DataConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from defaults, file and environment
    pub fn load() -> Result<ApiConfig> {
        let mut config = match env::var("CONFIG_PATH") {
            Ok(path) => {
                Self::load_from_file(&path).with_context(|| format!("loading config file {path}"))?
            }
            Err(_) => ApiConfig::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &str) -> Result<ApiConfig> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(address) = env::var("SALESDASH_BIND_ADDRESS") {
            self.bind_address = address;
        }
        if let Ok(path) = env::var("SALESDASH_DATA_PATH") {
            self.data.csv_path = path;
        }
        if let Ok(username) = env::var("SALESDASH_AUTH_USERNAME") {
            self.auth.username = username;
        }
        if let Ok(password) = env::var("SALESDASH_AUTH_PASSWORD") {
            self.auth.password = password;
        }
        if let Ok(ttl) = env::var("SALESDASH_TOKEN_TTL_MINUTES") {
            if let Ok(minutes) = ttl.parse() {
                self.auth.token_ttl_minutes = minutes;
            }
        }
    }

    /// Sanity checks applied after load
    pub fn validate(&self) -> Result<()> {
        self.bind_address
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("invalid bind address '{}': {}", self.bind_address, e))?;
        if self.auth.username.is_empty() {
            return Err(anyhow::anyhow!("auth username must not be empty"));
        }
        if self.auth.token_ttl_minutes <= 0 {
            return Err(anyhow::anyhow!(
                "token TTL must be positive, got {}",
                self.auth.token_ttl_minutes
            ));
        }
        Ok(())
    }
}
