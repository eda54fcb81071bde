use async_trait::async_trait;
use cache::ResultCache;
use common::metrics::{self, ProductSource};
use domain::ProductInfo;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{LocalProductMemo, ProductInfoResolver};
use crate::errors::ProductError;
use crate::keys::product_cache_key;

/// Cache-first product lookup with an HTTP fallback to the product service.
///
/// The shared cache is only read, never written: the product service
/// populates it, and whoever wrote an entry owns its TTL. When a
/// [`LocalProductMemo`] is attached it is consulted before the shared cache
/// and filled after every successful upstream fetch.
pub struct HybridProductResolver {
    cache: Arc<dyn ResultCache>,
    http: reqwest::Client,
    base_url: String,
    memo: Option<Arc<LocalProductMemo>>,
}

impl HybridProductResolver {
    /// `timeout` bounds each upstream request end to end
    pub fn new(
        cache: Arc<dyn ResultCache>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProductError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProductError::Connectivity(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            cache,
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            memo: None,
        })
    }

    pub fn with_local_memo(mut self, memo: Arc<LocalProductMemo>) -> Self {
        self.memo = Some(memo);
        self
    }

    /// A corrupt or unreadable entry counts as a miss
    async fn read_shared_cache(&self, product_id: Uuid) -> Option<ProductInfo> {
        let key = product_cache_key(product_id);

        let raw = match self.cache.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, "Product cache unavailable, falling back to upstream: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<ProductInfo>(&raw) {
            Ok(product) if product.id != product_id => {
                warn!(key = %key, cached_id = %product.id, "Ignoring cached product with another id");
                None
            }
            Ok(product) if product.is_well_formed() => Some(product),
            Ok(_) => {
                warn!(key = %key, "Ignoring cached product with negative price");
                None
            }
            Err(e) => {
                warn!(key = %key, "Ignoring corrupt cached product: {}", e);
                None
            }
        }
    }

    async fn fetch_upstream(&self, product_id: Uuid) -> Result<ProductInfo, ProductError> {
        let url = format!("{}/products/{}", self.base_url, product_id);
        debug!(url = %url, "Fetching product from upstream");

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!(product_id = %product_id, "Product service request failed: {}", e);
            ProductError::Connectivity(e.to_string())
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProductError::NotFound(product_id));
        }
        if !status.is_success() {
            warn!(product_id = %product_id, status = status.as_u16(), "Product service error");
            return Err(ProductError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ProductError::Connectivity(e.to_string()))?;
        let product: ProductInfo = serde_json::from_slice(&body)
            .map_err(|e| ProductError::InvalidResponse(e.to_string()))?;

        if product.id != product_id {
            return Err(ProductError::InvalidResponse(format!(
                "requested product {} but received {}",
                product_id, product.id
            )));
        }
        if !product.is_well_formed() {
            return Err(ProductError::InvalidResponse(format!(
                "negative price for product {}",
                product_id
            )));
        }

        Ok(product)
    }
}

#[async_trait]
impl ProductInfoResolver for HybridProductResolver {
    async fn get_product_info(&self, product_id: Uuid) -> Result<ProductInfo, ProductError> {
        if let Some(product) = self.memo.as_ref().and_then(|m| m.get(&product_id)) {
            debug!(product_id = %product_id, "Product served from local memo");
            metrics::record_product_lookup(ProductSource::Local);
            return Ok(product);
        }

        if let Some(product) = self.read_shared_cache(product_id).await {
            debug!(product_id = %product_id, "CACHE HIT (product info)");
            metrics::record_cache_request("product", true);
            metrics::record_product_lookup(ProductSource::Cache);
            return Ok(product);
        }

        debug!(product_id = %product_id, "CACHE MISS (product info)");
        metrics::record_cache_request("product", false);

        let product = self.fetch_upstream(product_id).await?;
        if let Some(memo) = &self.memo {
            memo.insert(product.clone());
        }
        metrics::record_product_lookup(ProductSource::Upstream);

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{product, UnreachableCache};
    use axum::extract::{Path, State};
    use axum::http::StatusCode as AxumStatus;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use cache::InMemoryCache;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KNOWN: &str = "a609d17d-7b24-4f40-b615-5e6f3d9a1f28";
    const BROKEN: &str = "00000000-0000-0000-0000-000000000500";
    const GARBLED: &str = "00000000-0000-0000-0000-000000000200";
    const SLOW: &str = "00000000-0000-0000-0000-000000000408";
    const NEGATIVE: &str = "00000000-0000-0000-0000-000000000422";
    const MISMATCHED: &str = "00000000-0000-0000-0000-000000000409";

    fn known_id() -> Uuid {
        Uuid::parse_str(KNOWN).unwrap()
    }

    #[derive(Clone, Default)]
    struct Upstream {
        hits: Arc<AtomicUsize>,
    }

    async fn product_handler(State(upstream): State<Upstream>, Path(id): Path<String>) -> Response {
        upstream.hits.fetch_add(1, Ordering::SeqCst);
        match id.as_str() {
            KNOWN => Json(serde_json::json!({
                "id": KNOWN, "name": "Keyboard", "price": "100.00", "qty": 50
            }))
            .into_response(),
            NEGATIVE => Json(serde_json::json!({
                "id": NEGATIVE, "name": "Refund", "price": "-1.00", "qty": 5
            }))
            .into_response(),
            MISMATCHED => Json(serde_json::json!({
                "id": KNOWN, "name": "Keyboard", "price": "100.00", "qty": 50
            }))
            .into_response(),
            BROKEN => AxumStatus::INTERNAL_SERVER_ERROR.into_response(),
            GARBLED => (AxumStatus::OK, "{not json").into_response(),
            SLOW => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                AxumStatus::OK.into_response()
            }
            _ => AxumStatus::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_upstream() -> (String, Upstream) {
        let upstream = Upstream::default();
        let app = Router::new()
            .route("/products/:id", get(product_handler))
            .with_state(upstream.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), upstream)
    }

    fn resolver(cache: Arc<dyn ResultCache>, base_url: &str) -> HybridProductResolver {
        HybridProductResolver::new(cache, base_url, Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        let (base_url, upstream) = spawn_upstream().await;
        let cache = Arc::new(InMemoryCache::new());
        let cached = product(known_id(), Decimal::new(4200, 2), 9);
        cache.insert(
            &product_cache_key(known_id()),
            serde_json::to_string(&cached).unwrap(),
            Duration::from_secs(30),
        );

        let found = resolver(cache.clone(), &base_url)
            .get_product_info(known_id())
            .await
            .unwrap();

        assert_eq!(found, cached);
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
        // no TTL extension on read
        assert!(cache.ttl(&product_cache_key(known_id())).unwrap() <= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_without_write_back() {
        let (base_url, upstream) = spawn_upstream().await;
        let cache = Arc::new(InMemoryCache::new());

        let found = resolver(cache.clone(), &base_url)
            .get_product_info(known_id())
            .await
            .unwrap();

        assert_eq!(found.unit_price, Decimal::new(10000, 2));
        assert_eq!(found.available_quantity, 50);
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
        assert!(!cache.contains(&product_cache_key(known_id())));
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_a_miss() {
        let (base_url, upstream) = spawn_upstream().await;
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(&product_cache_key(known_id()), "{\"id\":", Duration::from_secs(30));

        let found = resolver(cache, &base_url).get_product_info(known_id()).await;

        assert!(found.is_ok());
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_negative_cached_price_is_a_miss() {
        let (base_url, upstream) = spawn_upstream().await;
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(
            &product_cache_key(known_id()),
            serde_json::to_string(&product(known_id(), Decimal::new(-500, 2), 9)).unwrap(),
            Duration::from_secs(30),
        );

        let found = resolver(cache, &base_url)
            .get_product_info(known_id())
            .await
            .unwrap();

        assert_eq!(found.unit_price, Decimal::new(10000, 2));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_entry_for_another_product_is_a_miss() {
        let (base_url, upstream) = spawn_upstream().await;
        let cache = Arc::new(InMemoryCache::new());
        cache.insert(
            &product_cache_key(known_id()),
            serde_json::to_string(&product(Uuid::new_v4(), Decimal::new(1, 0), 1)).unwrap(),
            Duration::from_secs(30),
        );

        let found = resolver(cache, &base_url)
            .get_product_info(known_id())
            .await
            .unwrap();

        assert_eq!(found.id, known_id());
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_cache_falls_back_to_upstream() {
        let (base_url, upstream) = spawn_upstream().await;

        let found = resolver(Arc::new(UnreachableCache), &base_url)
            .get_product_info(known_id())
            .await;

        assert!(found.is_ok());
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found() {
        let (base_url, _) = spawn_upstream().await;
        let missing = Uuid::new_v4();

        let err = resolver(Arc::new(InMemoryCache::new()), &base_url)
            .get_product_info(missing)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status() {
        let (base_url, _) = spawn_upstream().await;

        let err = resolver(Arc::new(InMemoryCache::new()), &base_url)
            .get_product_info(Uuid::parse_str(BROKEN).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Upstream { status: 500 }));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let (base_url, _) = spawn_upstream().await;

        let err = resolver(Arc::new(InMemoryCache::new()), &base_url)
            .get_product_info(Uuid::parse_str(GARBLED).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_negative_upstream_price_is_invalid_response() {
        let (base_url, upstream) = spawn_upstream().await;

        let err = resolver(Arc::new(InMemoryCache::new()), &base_url)
            .get_product_info(Uuid::parse_str(NEGATIVE).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::InvalidResponse(_)));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_response_for_another_product_is_rejected() {
        let (base_url, _) = spawn_upstream().await;
        let memo = Arc::new(LocalProductMemo::new());
        let requested = Uuid::parse_str(MISMATCHED).unwrap();

        let err = resolver(Arc::new(InMemoryCache::new()), &base_url)
            .with_local_memo(memo.clone())
            .get_product_info(requested)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::InvalidResponse(_)));
        assert!(memo.is_empty());
        assert!(memo.get(&known_id()).is_none());
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let (base_url, _) = spawn_upstream().await;

        let err = resolver(Arc::new(InMemoryCache::new()), &base_url)
            .get_product_info(Uuid::parse_str(SLOW).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = resolver(Arc::new(InMemoryCache::new()), &format!("http://{}", addr))
            .get_product_info(known_id())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::Connectivity(_)));
    }

    #[tokio::test]
    async fn test_local_memo_is_filled_and_consulted_first() {
        let (base_url, upstream) = spawn_upstream().await;
        let cache = Arc::new(InMemoryCache::new());
        let memo = Arc::new(LocalProductMemo::new());
        let resolver = resolver(cache.clone(), &base_url).with_local_memo(memo.clone());

        resolver.get_product_info(known_id()).await.unwrap();
        assert_eq!(memo.len(), 1);

        // a newer shared-cache entry is shadowed by the memo
        cache.insert(
            &product_cache_key(known_id()),
            serde_json::to_string(&product(known_id(), Decimal::new(1, 0), 1)).unwrap(),
            Duration::from_secs(30),
        );
        let again = resolver.get_product_info(known_id()).await.unwrap();

        assert_eq!(again.unit_price, Decimal::new(10000, 2));
        assert_eq!(upstream.hits.load(Ordering::SeqCst), 1);

        memo.invalidate(&known_id());
        let refreshed = resolver.get_product_info(known_id()).await.unwrap();
        assert_eq!(refreshed.unit_price, Decimal::new(1, 0));
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_touch_memo() {
        let (base_url, _) = spawn_upstream().await;
        let memo = Arc::new(LocalProductMemo::new());
        let resolver =
            resolver(Arc::new(InMemoryCache::new()), &base_url).with_local_memo(memo.clone());

        assert!(resolver.get_product_info(Uuid::new_v4()).await.is_err());
        assert!(memo.is_empty());
    }
}
