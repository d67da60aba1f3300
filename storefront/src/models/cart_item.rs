// storefront/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::money::{self, LineAmount};

/// Row of `cart_items`. One per (cart, product); repeated adds bump `quantity`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: i64,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

/// A cart item joined with its product. Prices are read at query time,
/// so a catalog price change shows up on the next read.
#[derive(Debug, Clone, FromRow)]
pub struct CartLine {
  pub item_id: Uuid,
  pub product_id: i64,
  pub name: String,
  pub image_url: Option<String>,
  pub price_cents: i64,
  pub discount_cents: i64,
  pub stock: i32,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

impl LineAmount for CartLine {
  fn quantity(&self) -> i64 {
    i64::from(self.quantity)
  }

  fn unit_price_cents(&self) -> i64 {
    money::unit_price_cents(self.price_cents, self.discount_cents)
  }
}
