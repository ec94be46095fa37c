//! Song catalog backends
//!
//! The catalog of record lives outside this service. Each backend knows how to
//! pull the full list of songs with their required chords; the
//! [`CatalogCache`](crate::services::catalog_cache::CatalogCache) decides when
//! to call it.

use crate::{error::AppResult, models::Song};

pub mod http;
pub mod memory;
pub mod postgres;

pub use http::HttpCatalogStore;
pub use memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

/// Trait for song catalog backends
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch every song in the catalog
    ///
    /// Order is preserved into the snapshot, so backends should return a stable
    /// order between calls.
    async fn fetch_catalog(&self) -> AppResult<Vec<Song>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
