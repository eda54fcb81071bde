use super::{OrderStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{NewOrder, Order, OrderStatus};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info};
use uuid::Uuid;

const CREATE_ORDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id          UUID PRIMARY KEY,
    product_id  UUID NOT NULL,
    total_price NUMERIC(12, 2) NOT NULL CHECK (total_price >= 0),
    status      VARCHAR(50) NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_PRODUCT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_orders_product_id ON orders (product_id)";

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    product_id: Uuid,
    total_price: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e: domain::DomainError| {
            StoreError::CorruptRow {
                id: row.id,
                reason: e.to_string(),
            }
        })?;

        Ok(Order {
            id: row.id,
            product_id: row.product_id,
            total_price: row.total_price,
            status,
            created_at: row.created_at,
        })
    }
}

/// PostgreSQL implementation of the order store
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the database pool (useful for testing)
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `orders` table and its product index if missing
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_ORDERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_PRODUCT_INDEX).execute(&self.pool).await?;
        info!("Orders schema is up to date");
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn save(&self, order: NewOrder) -> Result<Order, StoreError> {
        debug!(order_id = %order.id, product_id = %order.product_id, "Inserting order");

        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, product_id, total_price, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, product_id, total_price, status, created_at
            "#,
        )
        .bind(order.id)
        .bind(order.product_id)
        .bind(order.total_price)
        .bind(order.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!(order_id = %order.id, "Failed to insert order: {}", e);
            e
        })?;

        Order::try_from(row)
    }

    async fn find_by_product_id(&self, product_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, product_id, total_price, status, created_at
            FROM orders
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(product_id = %product_id, count = rows.len(), "Loaded orders for product");

        rows.into_iter().map(Order::try_from).collect()
    }
}
