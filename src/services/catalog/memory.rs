use tokio::sync::RwLock;

use crate::{error::AppResult, models::Song, services::catalog::CatalogStore};

/// Catalog held in process memory
///
/// Useful for local development and for exercising the cache without a
/// database. `replace` simulates a catalog mutation upstream.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    songs: RwLock<Vec<Song>>,
}

impl InMemoryCatalogStore {
    pub fn new(songs: Vec<Song>) -> Self {
        Self {
            songs: RwLock::new(songs),
        }
    }

    pub async fn replace(&self, songs: Vec<Song>) {
        *self.songs.write().await = songs;
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn fetch_catalog(&self) -> AppResult<Vec<Song>> {
        Ok(self.songs.read().await.clone())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
