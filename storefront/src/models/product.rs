// storefront/src/models/product.rs

use serde::Serialize;
use sqlx::FromRow;

use crate::money;

/// Read-only catalog snapshot of a product.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: i64,
  pub name: String,
  pub price_cents: i64,
  /// Flat discount per unit.
  pub discount_cents: i64,
  pub image_url: Option<String>,
  pub stock: i32,
}

impl Product {
  pub fn unit_price_cents(&self) -> i64 {
    money::unit_price_cents(self.price_cents, self.discount_cents)
  }
}
