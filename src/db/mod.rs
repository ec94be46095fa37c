pub mod postgres;
pub mod redis;
pub mod store;

pub use postgres::create_pool;
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use store::{InMemoryRecommendationStore, RecommendationStore};
