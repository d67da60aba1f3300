// storefront/src/store/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{cart_not_found, check_quantity, quantity_cap_exceeded, CartStore};
use crate::errors::Result;
use crate::models::{Cart, CartLine, CartView};
use crate::session::SessionId;

/// Get-or-create the cart and insert-or-increment the line in one statement.
/// The `WHERE` on the update branch enforces the per-line cap; when it fails
/// no row is affected. The sum is compared in bigint so it cannot overflow.
const ADD_ITEM_SQL: &str = r#"
WITH cart AS (
  INSERT INTO carts (session_id)
  VALUES ($1)
  ON CONFLICT (session_id) DO UPDATE SET session_id = EXCLUDED.session_id
  RETURNING id
)
INSERT INTO cart_items (cart_id, product_id, quantity)
SELECT cart.id, $2, $3 FROM cart
ON CONFLICT (cart_id, product_id) DO UPDATE
  SET quantity = cart_items.quantity + EXCLUDED.quantity
  WHERE cart_items.quantity::bigint + EXCLUDED.quantity::bigint <= $4
"#;

const REMOVE_ITEM_SQL: &str = r#"
WITH cart AS (
  SELECT id FROM carts WHERE session_id = $1
),
removed AS (
  DELETE FROM cart_items
  WHERE cart_id IN (SELECT id FROM cart) AND product_id = $2
  RETURNING 1
)
SELECT (SELECT id FROM cart) AS cart_id, (SELECT COUNT(*) FROM removed) AS removed
"#;

const CART_LINES_SQL: &str = r#"
SELECT
  ci.id AS item_id,
  ci.product_id,
  p.name,
  p.image_url,
  p.price_cents,
  p.discount_cents,
  p.stock,
  ci.quantity,
  ci.added_at
FROM cart_items ci
JOIN products p ON p.id = ci.product_id
WHERE ci.cart_id = $1
ORDER BY ci.added_at, ci.id
"#;

#[derive(Clone)]
pub struct PgCartStore {
  pool: PgPool,
  max_quantity_per_item: i32,
}

impl PgCartStore {
  pub fn new(pool: PgPool, max_quantity_per_item: i32) -> Self {
    Self {
      pool,
      max_quantity_per_item,
    }
  }
}

#[async_trait]
impl CartStore for PgCartStore {
  #[instrument(name = "PgCartStore::get_cart", skip_all, fields(session = %session.short()))]
  async fn get_cart(&self, session: &SessionId) -> Result<Option<CartView>> {
    let cart = sqlx::query_as::<_, Cart>("SELECT id, session_id, created_at FROM carts WHERE session_id = $1")
      .bind(session.as_str())
      .fetch_optional(&self.pool)
      .await?;

    let Some(cart) = cart else {
      return Ok(None);
    };

    let lines = sqlx::query_as::<_, CartLine>(CART_LINES_SQL)
      .bind(cart.id)
      .fetch_all(&self.pool)
      .await?;

    Ok(Some(CartView { cart, lines }))
  }

  #[instrument(name = "PgCartStore::add_item", skip(self, session), fields(session = %session.short()))]
  async fn add_item(&self, session: &SessionId, product_id: i64, quantity: i32) -> Result<()> {
    check_quantity(quantity, self.max_quantity_per_item)?;

    let result = sqlx::query(ADD_ITEM_SQL)
      .bind(session.as_str())
      .bind(product_id)
      .bind(quantity)
      .bind(i64::from(self.max_quantity_per_item))
      .execute(&self.pool)
      .await?;

    if result.rows_affected() == 0 {
      return Err(quantity_cap_exceeded(self.max_quantity_per_item));
    }
    debug!("Cart line inserted or incremented.");
    Ok(())
  }

  #[instrument(name = "PgCartStore::remove_item", skip(self, session), fields(session = %session.short()))]
  async fn remove_item(&self, session: &SessionId, product_id: i64) -> Result<u64> {
    let (cart_id, removed) = sqlx::query_as::<_, (Option<Uuid>, i64)>(REMOVE_ITEM_SQL)
      .bind(session.as_str())
      .bind(product_id)
      .fetch_one(&self.pool)
      .await?;

    if cart_id.is_none() {
      return Err(cart_not_found());
    }
    Ok(removed as u64)
  }

  #[instrument(name = "PgCartStore::clear_cart", skip_all, fields(session = %session.short()))]
  async fn clear_cart(&self, session: &SessionId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE session_id = $1)")
      .bind(session.as_str())
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }
}
