pub mod catalog;
pub mod catalog_cache;
pub mod recommendations;
pub mod scorer;

pub use catalog::CatalogStore;
pub use catalog_cache::CatalogCache;
pub use recommendations::RecommendationService;
