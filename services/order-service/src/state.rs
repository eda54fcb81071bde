use anyhow::Result;
use cache::RedisCache;
use common::AppConfig;
use messaging::KafkaEventPublisher;
use order_store::PostgresOrderStore;
use ordering::{HybridProductResolver, LocalProductMemo, OrderService, OrderServiceSettings};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<OrderService>,
}

impl AppState {
    pub fn new(orders: OrderService) -> Self {
        Self {
            orders: Arc::new(orders),
        }
    }

    /// Connect every backend and wire the order service
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        info!("Connecting to database");
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        let store = PostgresOrderStore::new(pool);
        store.ensure_schema().await?;

        info!("Connecting to Redis at {}", config.cache.redis_url);
        let cache = RedisCache::new(&config.cache.redis_url).await?;
        cache.ping().await?;
        let cache = Arc::new(cache);

        info!("Creating Kafka event publisher");
        let publisher = KafkaEventPublisher::new(&config.kafka.brokers)?;

        let mut resolver = HybridProductResolver::new(
            cache.clone(),
            config.product_service.base_url.clone(),
            config.product_service.timeout(),
        )?;
        if config.product_service.local_memo {
            info!("Product info memo enabled");
            resolver = resolver.with_local_memo(Arc::new(LocalProductMemo::new()));
        }

        let service = OrderService::new(
            Arc::new(resolver),
            Arc::new(store),
            cache,
            Arc::new(publisher),
            OrderServiceSettings {
                topic: config.kafka.topic.clone(),
                listing_ttl: config.cache.order_listing_ttl(),
            },
        );

        Ok(Self::new(service))
    }
}
