use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{error::AppResult, models::StoredRecommendation};

/// Write-once storage for persisted recommendations
///
/// Records are never updated in place; each expires on its own after the
/// retention window passed to `put`.
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn put(&self, record: &StoredRecommendation, retention: Duration) -> AppResult<()>;

    /// Returns `None` for unknown or expired ids
    async fn get(&self, id: Uuid) -> AppResult<Option<StoredRecommendation>>;
}

/// Process-local recommendation store used when no Redis is configured
#[derive(Default)]
pub struct InMemoryRecommendationStore {
    records: RwLock<HashMap<Uuid, (Instant, StoredRecommendation)>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn put(&self, record: &StoredRecommendation, retention: Duration) -> AppResult<()> {
        let now = Instant::now();
        let mut records = self.records.write().await;

        // Sweep on write so expired entries don't pile up
        let before = records.len();
        records.retain(|_, (expires_at, _)| *expires_at > now);
        let swept = before - records.len();
        if swept > 0 {
            tracing::debug!(swept, "Expired recommendations removed");
        }

        records.insert(record.recommendation_id, (now + retention, record.clone()));
        Ok(())
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<StoredRecommendation>> {
        let records = self.records.read().await;
        Ok(records
            .get(&id)
            .filter(|(expires_at, _)| *expires_at > Instant::now())
            .map(|(_, record)| record.clone()))
    }
}
