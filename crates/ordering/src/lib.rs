//! Order orchestration: product pricing, order creation and cached
//! product-scoped listings.

pub mod errors;
pub mod keys;
pub mod product;
pub mod service;

#[cfg(test)]
mod test_support;

pub use errors::{OrderError, ProductError};
pub use product::{HybridProductResolver, LocalProductMemo, ProductInfoResolver};
pub use service::{OrderService, OrderServiceSettings};
