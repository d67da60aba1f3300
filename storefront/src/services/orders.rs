// storefront/src/services/orders.rs

use async_trait::async_trait;
use parking_lot::Mutex;
use sqlx::PgPool;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{NewOrder, Order, OrderLine, OrderStatus};

const ORDER_CODE_CONSTRAINT: &str = "orders_order_code_key";

#[derive(Debug)]
pub enum PersistOutcome {
  Created(Order),
  /// Another order already uses this code; nothing was written.
  CodeTaken,
}

/// Receives orders created by checkout and owns them afterwards.
#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Stores the order and its lines atomically with status `pending`.
  async fn create_order(&self, order: &NewOrder) -> Result<PersistOutcome>;
}

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn is_code_collision(err: &sqlx::Error) -> bool {
  match err {
    sqlx::Error::Database(db_err) => {
      db_err.is_unique_violation() && db_err.constraint() == Some(ORDER_CODE_CONSTRAINT)
    }
    _ => false,
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "PgOrderStore::create_order", skip_all, fields(order_code = %order.order_code))]
  async fn create_order(&self, order: &NewOrder) -> Result<PersistOutcome> {
    let mut tx = self.pool.begin().await?;

    let inserted = sqlx::query_as::<_, Order>(
      r#"
      INSERT INTO orders (order_code, customer_name, customer_email, total_cents, status)
      VALUES ($1, $2, $3, $4, $5)
      RETURNING id, order_code, customer_name, customer_email, total_cents, status, created_at
      "#,
    )
    .bind(&order.order_code)
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(order.total_cents)
    .bind(OrderStatus::Pending)
    .fetch_one(&mut *tx)
    .await;

    let created = match inserted {
      Ok(created) => created,
      Err(e) if is_code_collision(&e) => {
        warn!("Order code already taken.");
        tx.rollback().await?;
        return Ok(PersistOutcome::CodeTaken);
      }
      Err(e) => return Err(e.into()),
    };

    for line in &order.lines {
      sqlx::query(
        "INSERT INTO order_items (order_id, product_id, name, unit_price_cents, quantity) VALUES ($1, $2, $3, $4, $5)",
      )
      .bind(created.id)
      .bind(line.product_id)
      .bind(&line.name)
      .bind(line.unit_price_cents)
      .bind(line.quantity)
      .execute(&mut *tx)
      .await?;
    }

    tx.commit().await?;
    Ok(PersistOutcome::Created(created))
  }
}

/// Keeps orders in memory. Can be told to fail or to reject codes, to
/// exercise checkout's failure paths.
#[derive(Default)]
pub struct InMemoryOrderStore {
  orders: Mutex<Vec<(Order, Vec<OrderLine>)>>,
  unavailable: AtomicBool,
  codes_to_reject: AtomicU32,
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn orders(&self) -> Vec<(Order, Vec<OrderLine>)> {
    self.orders.lock().clone()
  }

  /// While set, every `create_order` fails with a storage error.
  pub fn set_unavailable(&self, unavailable: bool) {
    self.unavailable.store(unavailable, Ordering::SeqCst);
  }

  /// The next `count` attempts report their code as taken.
  pub fn reject_next_codes(&self, count: u32) {
    self.codes_to_reject.store(count, Ordering::SeqCst);
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  async fn create_order(&self, order: &NewOrder) -> Result<PersistOutcome> {
    if self.unavailable.load(Ordering::SeqCst) {
      return Err(AppError::Storage("order store unavailable".to_string()));
    }
    let rejected = self
      .codes_to_reject
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
      .is_ok();
    if rejected {
      return Ok(PersistOutcome::CodeTaken);
    }

    let mut orders = self.orders.lock();
    if orders.iter().any(|(o, _)| o.order_code == order.order_code) {
      return Ok(PersistOutcome::CodeTaken);
    }
    let created = Order {
      id: Uuid::new_v4(),
      order_code: order.order_code.clone(),
      customer_name: order.customer_name.clone(),
      customer_email: order.customer_email.clone(),
      total_cents: order.total_cents,
      status: OrderStatus::Pending,
      created_at: chrono::Utc::now(),
    };
    orders.push((created.clone(), order.lines.clone()));
    Ok(PersistOutcome::Created(created))
  }
}
