pub mod postgres_order_store;

pub use postgres_order_store::PostgresOrderStore;

use async_trait::async_trait;
use domain::{NewOrder, Order};
use thiserror::Error;
use uuid::Uuid;

/// Durable storage for orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order, returning it with its persistence timestamp
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// All orders for a product. Empty when nothing matches.
    async fn find_by_product_id(&self, product_id: Uuid) -> Result<Vec<Order>, StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Corrupt order row {id}: {reason}")]
    CorruptRow { id: Uuid, reason: String },
}
