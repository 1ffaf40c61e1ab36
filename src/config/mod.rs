use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub pagination: PaginationConfig,
    pub pantry: PantryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub api_rate_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub api_max_limit: usize,
    pub default_page_size: usize,
    pub max_request_body_size: usize,
}

/// Pantry matching limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PantryConfig {
    /// Maximum number of published recipes examined per request
    pub candidate_limit: usize,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PantryConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 50,
            default_limit: 10,
            max_limit: 50,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: &str) -> Result<T> {
    std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {name} value")))
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/bepviet.db".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("PORT", "3000")?;
        let external_url = std::env::var("EXTERNAL_URL").ok();
        let api_rate_limit = env_or("API_RATE_LIMIT", "100")?;

        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", "25")?;
        let min_connections = env_or("DATABASE_MIN_CONNECTIONS", "5")?;
        let connection_timeout_seconds = env_or("DATABASE_CONNECTION_TIMEOUT", "30")?;
        let idle_timeout_seconds = env_or("DATABASE_IDLE_TIMEOUT", "600")?;

        let api_max_limit = env_or("API_MAX_LIMIT", "100")?;
        let default_page_size = env_or("DEFAULT_PAGE_SIZE", "20")?;
        let max_request_body_size = env_or("MAX_REQUEST_BODY_SIZE", "1048576")?;

        let candidate_limit = env_or("PANTRY_CANDIDATE_LIMIT", "50")?;
        let default_limit = env_or("PANTRY_DEFAULT_LIMIT", "10")?;
        let max_limit = env_or("PANTRY_MAX_LIMIT", "50")?;

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                external_url,
                api_rate_limit,
            },
            pagination: PaginationConfig {
                api_max_limit,
                default_page_size,
                max_request_body_size,
            },
            pantry: PantryConfig {
                candidate_limit,
                default_limit,
                max_limit,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("API rate limit must be non-zero".to_string()));
        }

        if self.pantry.candidate_limit == 0 {
            return Err(Error::Config(
                "Pantry candidate limit must be non-zero".to_string(),
            ));
        }

        if self.pantry.default_limit == 0 || self.pantry.default_limit > self.pantry.max_limit {
            return Err(Error::Config(format!(
                "Pantry default limit must be between 1 and {}",
                self.pantry.max_limit
            )));
        }

        Ok(())
    }

    /// Base URL the CLI uses to reach a running server
    pub fn server_url(&self) -> String {
        self.server
            .external_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
            min_connections: 1,
            connection_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            external_url: None,
            api_rate_limit: 100,
        },
        pagination: PaginationConfig {
            api_max_limit: 100,
            default_page_size: 20,
            max_request_body_size: 1048576,
        },
        pantry: PantryConfig::default(),
    }
}
