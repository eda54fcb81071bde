use cache::ResultCache;
use common::metrics::{self, SideEffect};
use domain::{CreateOrderRequest, DomainEvent, NewOrder, Order, OrderCreatedEvent};
use messaging::EventPublisher;
use order_store::OrderStore;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::{OrderError, ProductError};
use crate::keys::orders_cache_key;
use crate::product::ProductInfoResolver;

#[derive(Debug, Clone)]
pub struct OrderServiceSettings {
    /// Topic order events are published to
    pub topic: String,
    /// Expiry of cached order listings
    pub listing_ttl: Duration,
}

impl Default for OrderServiceSettings {
    fn default() -> Self {
        Self {
            topic: "orders_exchange".to_string(),
            listing_ttl: Duration::from_secs(600),
        }
    }
}

/// Coordinates pricing, persistence, announcement and listing caches.
///
/// Holds only shared handles, so one instance serves all requests.
pub struct OrderService {
    resolver: Arc<dyn ProductInfoResolver>,
    store: Arc<dyn OrderStore>,
    cache: Arc<dyn ResultCache>,
    publisher: Arc<dyn EventPublisher>,
    settings: OrderServiceSettings,
}

impl OrderService {
    pub fn new(
        resolver: Arc<dyn ProductInfoResolver>,
        store: Arc<dyn OrderStore>,
        cache: Arc<dyn ResultCache>,
        publisher: Arc<dyn EventPublisher>,
        settings: OrderServiceSettings,
    ) -> Self {
        Self {
            resolver,
            store,
            cache,
            publisher,
            settings,
        }
    }

    /// Price, persist and announce an order.
    ///
    /// Fails without side effects if the product can't be resolved, stock is
    /// short or the store rejects the write. Once the order is stored the
    /// call succeeds; publishing and listing invalidation are best effort.
    pub async fn create_order(&self, req: &CreateOrderRequest) -> Result<Order, OrderError> {
        let start = Instant::now();
        let result = self.create_order_inner(req).await;
        metrics::record_command("create_order", result.is_ok(), start.elapsed().as_secs_f64());
        result
    }

    async fn create_order_inner(&self, req: &CreateOrderRequest) -> Result<Order, OrderError> {
        let product = self.resolver.get_product_info(req.product_id).await?;

        if !product.has_stock_for(req.quantity) {
            info!(
                product_id = %req.product_id,
                requested = req.quantity,
                available = product.available_quantity,
                "Rejecting order: insufficient stock"
            );
            return Err(OrderError::InsufficientStock {
                product_id: req.product_id,
                requested: req.quantity,
                available: product.available_quantity,
            });
        }

        let total_price = product.total_for(req.quantity).ok_or_else(|| {
            ProductError::InvalidResponse(format!(
                "price {} for product {} overflows at quantity {}",
                product.unit_price, req.product_id, req.quantity
            ))
        })?;
        let new_order = NewOrder::pending(req.product_id, total_price);

        let order = self.store.save(new_order).await.map_err(|e| {
            error!(product_id = %req.product_id, "Failed to save order: {}", e);
            OrderError::Storage(e)
        })?;

        info!(
            order_id = %order.id,
            product_id = %order.product_id,
            total_price = %order.total_price,
            "Order created"
        );

        let published = self.publish_order_created(&order, req.quantity).await;
        report(SideEffect::Publish, order.product_id, published);

        let invalidated = self.cache.delete(&orders_cache_key(req.product_id)).await;
        report(SideEffect::ListingInvalidate, req.product_id, invalidated);

        Ok(order)
    }

    async fn publish_order_created(&self, order: &Order, quantity: u32) -> Result<(), String> {
        let event = OrderCreatedEvent::from_order(order, quantity);
        let body = event.to_body().map_err(|e| e.to_string())?;

        self.publisher
            .publish(&self.settings.topic, OrderCreatedEvent::routing_key(), body)
            .await
            .map_err(|e| e.to_string())
    }

    /// Orders for a product, served from the listing cache when possible.
    /// Order is whatever the store returns.
    pub async fn get_orders_by_product_id(&self, product_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let start = Instant::now();
        let result = self.get_orders_inner(product_id).await;
        metrics::record_command("list_orders", result.is_ok(), start.elapsed().as_secs_f64());
        result
    }

    async fn get_orders_inner(&self, product_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let key = orders_cache_key(product_id);

        if let Some(orders) = self.read_listing(&key).await {
            debug!(product_id = %product_id, count = orders.len(), "CACHE HIT (orders)");
            metrics::record_cache_request("listing", true);
            return Ok(orders);
        }

        debug!(product_id = %product_id, "CACHE MISS (orders)");
        metrics::record_cache_request("listing", false);

        let orders = self.store.find_by_product_id(product_id).await?;

        let populated = match serde_json::to_string(&orders) {
            Ok(json) => self
                .cache
                .set(&key, json, self.settings.listing_ttl)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        report(SideEffect::ListingPopulate, product_id, populated);

        Ok(orders)
    }

    /// Unreadable or malformed entries count as a miss
    async fn read_listing(&self, key: &str) -> Option<Vec<Order>> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, "Order cache unavailable: {}", e);
                return None;
            }
        };

        serde_json::from_str(&raw)
            .map_err(|e| warn!(key, "Ignoring malformed cached order listing: {}", e))
            .ok()
    }
}

/// Outcome channel for best-effort steps: counted always, logged on failure
fn report<E: Display>(effect: SideEffect, product_id: Uuid, outcome: Result<(), E>) {
    match outcome {
        Ok(()) => metrics::record_side_effect(effect, true),
        Err(e) => {
            metrics::record_side_effect(effect, false);
            warn!(
                effect = effect.as_str(),
                product_id = %product_id,
                "Best-effort step failed: {}",
                e
            );
        }
    }
}
