use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chordpath_api::{
    config::{CatalogSource, Config},
    db::{create_pool, create_redis_client, Cache, InMemoryRecommendationStore, RecommendationStore},
    routes::{create_router, AppState},
    services::{
        catalog::{CatalogStore, HttpCatalogStore, PostgresCatalogStore},
        CatalogCache, RecommendationService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chordpath_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog_store: Arc<dyn CatalogStore> = match config.catalog_source()? {
        CatalogSource::Postgres(url) => {
            let pool = create_pool(&url).await?;
            sqlx::migrate!().run(&pool).await?;
            tracing::info!("Database migrations applied");
            Arc::new(PostgresCatalogStore::new(pool))
        }
        CatalogSource::Http(url) => {
            tracing::info!(url = %url, "Using HTTP catalog");
            Arc::new(HttpCatalogStore::new(url))
        }
    };

    let store: Arc<dyn RecommendationStore> = match &config.redis_url {
        Some(url) => Arc::new(Cache::new(create_redis_client(url)?).await?),
        None => {
            tracing::warn!("REDIS_URL not set, recommendations are kept in memory only");
            Arc::new(InMemoryRecommendationStore::new())
        }
    };

    let catalog = Arc::new(CatalogCache::new(
        catalog_store,
        config.cache_ttl(),
        config.fetch_timeout(),
    ));
    catalog.warm().await?;

    let service = RecommendationService::new(catalog, store, config.recommendation_retention());
    let app = create_router(Arc::new(AppState::new(service)));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
