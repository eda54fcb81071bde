use async_trait::async_trait;
use cache::{CacheError, ResultCache};
use chrono::Utc;
use domain::{NewOrder, Order, ProductInfo};
use messaging::{EventPublisher, PublisherError};
use order_store::{OrderStore, StoreError};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

pub fn product(id: Uuid, unit_price: Decimal, available_quantity: u32) -> ProductInfo {
    ProductInfo {
        id,
        name: "Test Product".to_string(),
        unit_price,
        available_quantity,
    }
}

/// Cache whose backend is always down
pub struct UnreachableCache;

#[async_trait]
impl ResultCache for UnreachableCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Connection("connection refused".to_string()))
    }
}

/// In-memory order store that counts calls
#[derive(Default)]
pub struct FakeStore {
    orders: Mutex<Vec<Order>>,
    pub save_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn saves(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn finds(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderStore for FakeStore {
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError(sqlx_pool_closed()));
        }
        let order = order.into_order(Utc::now());
        self.orders.lock().unwrap().push(order.clone());
        Ok(order)
    }

    async fn find_by_product_id(&self, product_id: Uuid) -> Result<Vec<Order>, StoreError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError(sqlx_pool_closed()));
        }
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.product_id == product_id)
            .cloned()
            .collect())
    }
}

fn sqlx_pool_closed() -> sqlx::Error {
    sqlx::Error::PoolClosed
}

#[derive(Debug, Clone)]
pub struct Published {
    pub topic: String,
    pub routing_key: String,
    pub body: Vec<u8>,
}

/// Publisher that records every attempt
#[derive(Default)]
pub struct FakePublisher {
    pub published: Mutex<Vec<Published>>,
    pub fail: AtomicBool,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.fail.store(true, Ordering::SeqCst);
        publisher
    }

    pub fn attempts(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for FakePublisher {
    async fn publish(
        &self,
        topic: &str,
        routing_key: &str,
        body: Vec<u8>,
    ) -> Result<(), PublisherError> {
        self.published.lock().unwrap().push(Published {
            topic: topic.to_string(),
            routing_key: routing_key.to_string(),
            body,
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublisherError::PublishFailed("broker unavailable".to_string()));
        }
        Ok(())
    }
}
