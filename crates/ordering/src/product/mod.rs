pub mod memo;
pub mod resolver;

pub use memo::LocalProductMemo;
pub use resolver::HybridProductResolver;

use async_trait::async_trait;
use domain::ProductInfo;
use uuid::Uuid;

use crate::errors::ProductError;

/// Source of current product price and stock
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductInfoResolver: Send + Sync {
    async fn get_product_info(&self, product_id: Uuid) -> Result<ProductInfo, ProductError>;
}
