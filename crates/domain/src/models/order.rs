use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::DomainError;

/// Lifecycle status of an order.
///
/// Orders are created as `Pending`. Moving to `Processed` or `Failed` is done
/// by whoever consumes the `order.created` event, never by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Processed,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processed => "PROCESSED",
            OrderStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PROCESSED" => Ok(OrderStatus::Processed),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// A persisted order. Read-only once saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub product_id: Uuid,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// An order that has been priced but not yet written to the store.
/// The store assigns `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub id: Uuid,
    pub product_id: Uuid,
    pub total_price: Decimal,
    pub status: OrderStatus,
}

impl NewOrder {
    /// New pending order with a freshly generated identifier
    pub fn pending(product_id: Uuid, total_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            total_price,
            status: OrderStatus::Pending,
        }
    }

    /// Attach the persistence timestamp
    pub fn into_order(self, created_at: DateTime<Utc>) -> Order {
        Order {
            id: self.id,
            product_id: self.product_id,
            total_price: self.total_price,
            status: self.status,
            created_at,
        }
    }
}
