use order_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Failures resolving product info from the product service
#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Product service returned status {status}")]
    Upstream { status: u16 },

    #[error("Product service unreachable: {0}")]
    Connectivity(String),

    #[error("Invalid product service response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum OrderError {
    #[error(transparent)]
    Product(#[from] ProductError),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: u32,
        available: u32,
    },

    #[error("Failed to store order: {0}")]
    Storage(#[from] StoreError),
}
