use uuid::Uuid;

/// Shared product cache key. Same shape the product service uses for its
/// own response cache, so its entries are readable here.
pub fn product_cache_key(product_id: Uuid) -> String {
    format!("/products/{}", product_id)
}

/// Cached order listing for one product
pub fn orders_cache_key(product_id: Uuid) -> String {
    format!("orders_by_product:{}", product_id)
}
