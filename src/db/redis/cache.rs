use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use std::time::Duration;
use uuid::Uuid;

use crate::db::store::RecommendationStore;
use crate::error::AppError;
use crate::error::AppResult;
use crate::models::StoredRecommendation;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Recommendation(Uuid),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Recommendation(id) => write!(f, "rec:{}", id),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Redis-backed storage for short-lived records
///
/// Holds a connection manager, which reconnects on its own and is cheap to
/// clone per operation.
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

impl Cache {
    pub async fn new(redis_client: Client) -> AppResult<Self> {
        let conn = redis_client.get_connection_manager().await?;
        tracing::info!("Connected to Redis");
        Ok(Self { conn })
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent or has expired.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value that Redis expires after `ttl`
    ///
    /// Sub-second TTLs round up to one second.
    pub async fn set_with_ttl<T: serde::Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key.to_string(), json, ttl.as_secs().max(1)).await?;

        tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "Cached value");
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecommendationStore for Cache {
    async fn put(&self, record: &StoredRecommendation, retention: Duration) -> AppResult<()> {
        self.set_with_ttl(
            &CacheKey::Recommendation(record.recommendation_id),
            record,
            retention,
        )
        .await
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<StoredRecommendation>> {
        self.get_from_cache(&CacheKey::Recommendation(id)).await
    }
}
