// storefront/src/pipelines/contexts.rs

//! Per-request data carried through the pipelines inside a `FlowContext`.

use crate::models::{CartView, Order, OrderLine, Product};
use crate::session::SessionId;
use crate::state::AppState;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub session_id: SessionId,
  pub product_id: i64,
  pub requested_quantity: i64,
  /// Set once `validate_cart_input` accepted `requested_quantity`.
  pub quantity: i32,
  pub product: Option<Product>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, session_id: SessionId, product_id: i64, requested_quantity: i64) -> Self {
    Self {
      app_state,
      session_id,
      product_id,
      requested_quantity,
      quantity: 0,
      product: None,
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub session_id: SessionId,
  pub customer_name: String,
  pub customer_email: String,

  pub cart: Option<CartView>,
  pub order_lines: Vec<OrderLine>,
  pub total_cents: i64,
  pub order_code: Option<String>,
  pub code_attempts: u32,
  pub order: Option<Order>,
  pub cart_cleared: bool,
  pub notification_sent: bool,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, session_id: SessionId, customer_name: String, customer_email: String) -> Self {
    Self {
      app_state,
      session_id,
      customer_name,
      customer_email,
      cart: None,
      order_lines: Vec::new(),
      total_cents: 0,
      order_code: None,
      code_attempts: 0,
      order: None,
      cart_cleared: false,
      notification_sent: false,
    }
  }
}
