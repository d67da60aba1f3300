// storefront/src/store/mod.rs

//! Persistence of carts and their items, keyed by session.
//!
//! Every mutation is a single atomic operation in the backing store. Callers
//! never read a quantity, change it and write it back.

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::CartView;
use crate::session::SessionId;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCartStore;
pub use postgres::PgCartStore;

#[async_trait]
pub trait CartStore: Send + Sync {
  /// The session's cart joined with current product data. `None` if the
  /// session never added anything; this never creates a cart.
  async fn get_cart(&self, session: &SessionId) -> Result<Option<CartView>>;

  /// Creates the cart if needed, then inserts the line or increments it by
  /// `quantity`. Fails with `Validation` when the line would exceed the
  /// per-item cap.
  async fn add_item(&self, session: &SessionId, product_id: i64, quantity: i32) -> Result<()>;

  /// Deletes the line for `product_id`. `NotFound` when the session has no
  /// cart; a missing line is not an error. Returns the number of lines removed.
  async fn remove_item(&self, session: &SessionId, product_id: i64) -> Result<u64>;

  /// Deletes every line of the session's cart, keeping the cart itself.
  /// Returns the number of lines removed; `0` when there was no cart.
  async fn clear_cart(&self, session: &SessionId) -> Result<u64>;
}

pub(crate) fn cart_not_found() -> crate::errors::AppError {
  crate::errors::AppError::NotFound("Cart not found".to_string())
}

pub(crate) fn check_quantity(quantity: i32, max_quantity: i32) -> Result<()> {
  if quantity < 1 {
    return Err(crate::errors::AppError::Validation("qty must be at least 1".to_string()));
  }
  if quantity > max_quantity {
    return Err(quantity_cap_exceeded(max_quantity));
  }
  Ok(())
}

pub(crate) fn quantity_cap_exceeded(max_quantity: i32) -> crate::errors::AppError {
  crate::errors::AppError::Validation(format!(
    "Quantity per item cannot exceed {}",
    max_quantity
  ))
}
