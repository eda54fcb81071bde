use domain::ProductInfo;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Process-private copy of product snapshots fetched from upstream.
///
/// Entries never expire; a price change upstream is only seen here after
/// `invalidate` or `clear`.
#[derive(Debug, Default)]
pub struct LocalProductMemo {
    products: RwLock<HashMap<Uuid, ProductInfo>>,
}

impl LocalProductMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, product_id: &Uuid) -> Option<ProductInfo> {
        self.products.read().get(product_id).cloned()
    }

    pub fn insert(&self, product: ProductInfo) {
        self.products.write().insert(product.id, product);
    }

    /// Returns whether an entry was removed
    pub fn invalidate(&self, product_id: &Uuid) -> bool {
        self.products.write().remove(product_id).is_some()
    }

    pub fn clear(&self) {
        self.products.write().clear();
    }

    pub fn len(&self) -> usize {
        self.products.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }
}
