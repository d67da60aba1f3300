// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

use super::cart_item::CartLine;
use crate::money::LineAmount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Delivered,
  Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub order_code: String,
  pub customer_name: String,
  pub customer_email: String,
  pub total_cents: i64,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
}

/// Immutable line of an order, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub product_id: i64,
  pub name: String,
  pub unit_price_cents: i64,
  pub quantity: i32,
}

impl From<&CartLine> for OrderLine {
  fn from(line: &CartLine) -> Self {
    Self {
      product_id: line.product_id,
      name: line.name.clone(),
      unit_price_cents: line.unit_price_cents(),
      quantity: line.quantity,
    }
  }
}

impl LineAmount for OrderLine {
  fn quantity(&self) -> i64 {
    i64::from(self.quantity)
  }

  fn unit_price_cents(&self) -> i64 {
    self.unit_price_cents
  }
}

/// What checkout hands to the order store.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub order_code: String,
  pub customer_name: String,
  pub customer_email: String,
  pub total_cents: i64,
  pub lines: Vec<OrderLine>,
}
