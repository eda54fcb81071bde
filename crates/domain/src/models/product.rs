use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Point-in-time snapshot of a product owned by the product service.
///
/// The wire shape is the product service's own (`price`, `qty`), which is
/// also what it writes into the shared cache. `price` may arrive either as a
/// JSON number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Decimal,
    #[serde(rename = "qty")]
    pub available_quantity: u32,
}

impl ProductInfo {
    /// False for snapshots no order can be priced from (negative price)
    pub fn is_well_formed(&self) -> bool {
        !self.unit_price.is_sign_negative()
    }

    pub fn has_stock_for(&self, quantity: u32) -> bool {
        self.available_quantity >= quantity
    }

    /// `None` when the total does not fit in a `Decimal`
    pub fn total_for(&self, quantity: u32) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(quantity))
    }
}
