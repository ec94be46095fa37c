use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL for the song catalog
    #[serde(default)]
    pub database_url: Option<String>,

    /// HTTP endpoint serving the song catalog as JSON, used when no database is configured
    #[serde(default)]
    pub catalog_url: Option<String>,

    /// Redis connection URL for persisted recommendations (in-memory when unset)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Catalog snapshot time-to-live, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Timeout for a single backing catalog fetch, in seconds
    #[serde(default = "default_backing_fetch_timeout")]
    pub backing_fetch_timeout: u64,

    /// How long a persisted recommendation stays retrievable, in seconds
    #[serde(default = "default_recommendation_retention")]
    pub recommendation_retention: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_cache_ttl() -> u64 {
    30 * 60
}

fn default_backing_fetch_timeout() -> u64 {
    10
}

fn default_recommendation_retention() -> u64 {
    60 * 60
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Where the song catalog is loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Postgres(String),
    Http(String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.backing_fetch_timeout)
    }

    pub fn recommendation_retention(&self) -> Duration {
        Duration::from_secs(self.recommendation_retention)
    }

    /// Picks the catalog backend: PostgreSQL wins over HTTP when both are set
    pub fn catalog_source(&self) -> anyhow::Result<CatalogSource> {
        match (&self.database_url, &self.catalog_url) {
            (Some(url), _) => Ok(CatalogSource::Postgres(url.clone())),
            (None, Some(url)) => Ok(CatalogSource::Http(url.clone())),
            (None, None) => Err(anyhow::anyhow!(
                "No catalog source configured: set DATABASE_URL or CATALOG_URL"
            )),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
