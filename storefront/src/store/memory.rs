// storefront/src/store/memory.rs

//! Process-local cart store for tests and single-process demos.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::{cart_not_found, check_quantity, quantity_cap_exceeded, CartStore};
use crate::errors::Result;
use crate::models::{Cart, CartItem, CartLine, CartView};
use crate::services::catalog::ProductCatalog;
use crate::session::SessionId;

#[derive(Default)]
struct Carts {
  by_session: HashMap<String, Cart>,
  items: HashMap<Uuid, Vec<CartItem>>,
}

/// Same observable behavior as `PgCartStore`. Each mutation happens inside one
/// critical section of the mutex, which is never held across an `.await`.
pub struct InMemoryCartStore {
  catalog: Arc<dyn ProductCatalog>,
  max_quantity_per_item: i32,
  carts: Mutex<Carts>,
}

impl InMemoryCartStore {
  pub fn new(catalog: Arc<dyn ProductCatalog>, max_quantity_per_item: i32) -> Self {
    Self {
      catalog,
      max_quantity_per_item,
      carts: Mutex::new(Carts::default()),
    }
  }

  pub fn cart_count(&self) -> usize {
    self.carts.lock().by_session.len()
  }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
  async fn get_cart(&self, session: &SessionId) -> Result<Option<CartView>> {
    let snapshot = {
      let carts = self.carts.lock();
      carts.by_session.get(session.as_str()).cloned().map(|cart| {
        let items = carts.items.get(&cart.id).cloned().unwrap_or_default();
        (cart, items)
      })
    };

    let Some((cart, items)) = snapshot else {
      return Ok(None);
    };

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
      // Lines whose product vanished from the catalog are dropped, as the SQL join does.
      if let Some(product) = self.catalog.get_product(item.product_id).await? {
        lines.push(CartLine {
          item_id: item.id,
          product_id: item.product_id,
          name: product.name,
          image_url: product.image_url,
          price_cents: product.price_cents,
          discount_cents: product.discount_cents,
          stock: product.stock,
          quantity: item.quantity,
          added_at: item.added_at,
        });
      }
    }
    Ok(Some(CartView { cart, lines }))
  }

  async fn add_item(&self, session: &SessionId, product_id: i64, quantity: i32) -> Result<()> {
    check_quantity(quantity, self.max_quantity_per_item)?;

    let mut carts = self.carts.lock();
    let cart_id = carts
      .by_session
      .entry(session.as_str().to_string())
      .or_insert_with(|| Cart {
        id: Uuid::new_v4(),
        session_id: session.as_str().to_string(),
        created_at: Utc::now(),
      })
      .id;

    let items = carts.items.entry(cart_id).or_default();
    match items.iter_mut().find(|i| i.product_id == product_id) {
      Some(existing) => {
        existing.quantity = existing
          .quantity
          .checked_add(quantity)
          .filter(|n| *n <= self.max_quantity_per_item)
          .ok_or_else(|| quantity_cap_exceeded(self.max_quantity_per_item))?;
      }
      None => items.push(CartItem {
        id: Uuid::new_v4(),
        cart_id,
        product_id,
        quantity,
        added_at: Utc::now(),
      }),
    }
    Ok(())
  }

  async fn remove_item(&self, session: &SessionId, product_id: i64) -> Result<u64> {
    let mut carts = self.carts.lock();
    let cart_id = carts.by_session.get(session.as_str()).map(|c| c.id).ok_or_else(cart_not_found)?;

    let items = carts.items.entry(cart_id).or_default();
    let before = items.len();
    items.retain(|i| i.product_id != product_id);
    Ok((before - items.len()) as u64)
  }

  async fn clear_cart(&self, session: &SessionId) -> Result<u64> {
    let mut carts = self.carts.lock();
    let Some(cart_id) = carts.by_session.get(session.as_str()).map(|c| c.id) else {
      return Ok(0);
    };
    Ok(carts.items.remove(&cart_id).map_or(0, |items| items.len() as u64))
  }
}
