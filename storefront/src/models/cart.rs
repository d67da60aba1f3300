// storefront/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::cart_item::CartLine;
use crate::money;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  pub id: Uuid,
  #[serde(skip_serializing)] // the cookie already carries it
  pub session_id: String,
  pub created_at: DateTime<Utc>,
}

/// A cart with its lines joined to the current catalog data.
#[derive(Debug, Clone)]
pub struct CartView {
  pub cart: Cart,
  pub lines: Vec<CartLine>,
}

impl CartView {
  pub fn total_cents(&self) -> i64 {
    money::calculate_cart_total(&self.lines)
  }

  pub fn item_count(&self) -> i64 {
    money::item_count(&self.lines)
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }
}
