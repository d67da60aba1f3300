// storefront/src/pipelines/checkout_pipeline.rs

use cartflow::{FlowContext, FlowRegistry, Pipeline, SkipCondition, StepControl};
use chrono::{NaiveDate, Utc};
use rand_core::{OsRng, RngCore};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{NewOrder, OrderLine};
use crate::money;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::services::orders::PersistOutcome;

/// Unambiguous symbols: no 0/O, 1/I.
const ORDER_CODE_ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
const ORDER_CODE_SUFFIX_LEN: usize = 8;
pub const MAX_ORDER_CODE_ATTEMPTS: u32 = 3;

/// `ORD-YYYYMMDD-XXXXXXXX` with the suffix drawn from the OS RNG.
pub fn generate_order_code(date: NaiveDate) -> String {
  let suffix: String = (0..ORDER_CODE_SUFFIX_LEN)
    .map(|_| {
      // 32 divides 2^32, so the modulo is unbiased.
      let idx = (OsRng.next_u32() % ORDER_CODE_ALPHABET.len() as u32) as usize;
      ORDER_CODE_ALPHABET[idx] as char
    })
    .collect();
  format!("ORD-{}-{}", date.format("%Y%m%d"), suffix)
}

pub fn build_checkout_pipeline() -> Pipeline<CheckoutCtxData, AppError> {
  let order_missing: SkipCondition<CheckoutCtxData> = Arc::new(|ctx| ctx.read().order.is_none());

  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("load_cart_for_checkout", false, None),
    ("validate_customer_details", false, None),
    ("compute_order_total", false, None),
    ("generate_order_code", false, None),
    ("persist_order", false, None),
    ("clear_cart_after_order", false, Some(order_missing)),
    ("notify_order_placed", true, None),
  ]);

  p.on_step("load_cart_for_checkout", |ctx_data: FlowContext<CheckoutCtxData>| {
    Box::pin(async move {
      let (session_id, carts) = {
        let guard = ctx_data.read();
        (guard.session_id.clone(), guard.app_state.carts.clone())
      };

      let cart = match carts.get_cart(&session_id).await? {
        Some(cart) if !cart.is_empty() => cart,
        _ => {
          info!(session = %session_id.short(), "Checkout: cart is empty.");
          return Err(AppError::EmptyCart);
        }
      };

      ctx_data.write().cart = Some(cart);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.on_step("validate_customer_details", |ctx_data: FlowContext<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let name = guard.customer_name.trim().to_string();
      let email = guard.customer_email.trim().to_string();
      if name.is_empty() || email.is_empty() {
        return Err(AppError::Validation(
          "customerName and customerEmail are required".to_string(),
        ));
      }
      guard.customer_name = name;
      guard.customer_email = email;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // Freezes the current catalog prices into the order lines.
  p.on_step("compute_order_total", |ctx_data: FlowContext<CheckoutCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let lines: Vec<OrderLine> = match guard.cart.as_ref() {
        Some(cart) => cart.lines.iter().map(OrderLine::from).collect(),
        None => return Err(AppError::Internal("cart missing from checkout context".to_string())),
      };
      guard.total_cents = money::calculate_cart_total(&lines);
      guard.order_lines = lines;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p.on_step("generate_order_code", |ctx_data: FlowContext<CheckoutCtxData>| {
    Box::pin(async move {
      ctx_data.write().order_code = Some(generate_order_code(Utc::now().date_naive()));
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // Retries with a fresh code while the store reports a collision.
  p.on_step("persist_order", |ctx_data: FlowContext<CheckoutCtxData>| {
    Box::pin(async move {
      let (orders, mut new_order) = {
        let guard = ctx_data.read();
        let order_code = guard
          .order_code
          .clone()
          .ok_or_else(|| AppError::Internal("order code missing from checkout context".to_string()))?;
        (
          guard.app_state.orders.clone(),
          NewOrder {
            order_code,
            customer_name: guard.customer_name.clone(),
            customer_email: guard.customer_email.clone(),
            total_cents: guard.total_cents,
            lines: guard.order_lines.clone(),
          },
        )
      };

      for attempt in 1..=MAX_ORDER_CODE_ATTEMPTS {
        ctx_data.write().code_attempts = attempt;
        match orders.create_order(&new_order).await? {
          PersistOutcome::Created(order) => {
            info!(order_code = %order.order_code, total_cents = order.total_cents, "Checkout: order persisted.");
            let mut guard = ctx_data.write();
            guard.order_code = Some(order.order_code.clone());
            guard.order = Some(order);
            return Ok(StepControl::Continue);
          }
          PersistOutcome::CodeTaken => {
            warn!(attempt, order_code = %new_order.order_code, "Checkout: order code collision, regenerating.");
            new_order.order_code = generate_order_code(Utc::now().date_naive());
          }
        }
      }

      error!(attempts = MAX_ORDER_CODE_ATTEMPTS, "Checkout: could not allocate a unique order code.");
      Err::<StepControl, _>(AppError::Storage(
        "could not allocate a unique order code".to_string(),
      ))
    })
  });

  // Skipped unless `persist_order` stored an order.
  p.on_step("clear_cart_after_order", |ctx_data: FlowContext<CheckoutCtxData>| {
    Box::pin(async move {
      let (session_id, carts) = {
        let guard = ctx_data.read();
        (guard.session_id.clone(), guard.app_state.carts.clone())
      };
      let removed = carts.clear_cart(&session_id).await?;
      info!(session = %session_id.short(), removed, "Checkout: cart cleared.");
      ctx_data.write().cart_cleared = true;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // Best effort: the order already exists, so a failed notification is only logged.
  p.on_step("notify_order_placed", |ctx_data: FlowContext<CheckoutCtxData>| {
    Box::pin(async move {
      let (notifier, order, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.notifier.clone(), guard.order.clone(), guard.order_lines.clone())
      };
      let Some(order) = order else {
        return Ok::<_, AppError>(StepControl::Continue);
      };

      match notifier.order_placed(&order, &lines).await {
        Ok(()) => {
          ctx_data.write().notification_sent = true;
        }
        Err(e) => warn!(order_code = %order.order_code, error = %e, "Checkout: order notification failed."),
      }
      Ok(StepControl::Continue)
    })
  });

  p
}

pub fn register_checkout_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register(build_checkout_pipeline());
  info!("Checkout pipeline registered.");
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::models::Order;
  use crate::services::catalog::InMemoryCatalog;
  use crate::services::notifier::OrderNotifier;
  use crate::services::orders::InMemoryOrderStore;
  use crate::session::SessionId;
  use crate::state::AppState;
  use crate::store::InMemoryCartStore;
  use async_trait::async_trait;
  use cartflow::FlowOutcome;

  struct FailingNotifier;

  #[async_trait]
  impl OrderNotifier for FailingNotifier {
    async fn order_placed(&self, _order: &Order, _lines: &[OrderLine]) -> anyhow::Result<()> {
      anyhow::bail!("gateway down")
    }
  }

  struct Fixture {
    state: AppState,
    orders: Arc<InMemoryOrderStore>,
    session: SessionId,
  }

  fn fixture(notifier: Arc<dyn OrderNotifier>) -> Fixture {
    let catalog = Arc::new(InMemoryCatalog::new());
    catalog.insert_product(1, "Kopi Susu", 1500, 0, 10);
    catalog.insert_product(2, "Roti Bakar", 3500, 0, 10);
    let orders = Arc::new(InMemoryOrderStore::new());
    let carts = Arc::new(InMemoryCartStore::new(catalog.clone(), 99));
    let state = AppState::new(AppConfig::default(), carts, catalog, orders.clone(), notifier);
    Fixture {
      state,
      orders,
      session: SessionId::generate(),
    }
  }

  fn checkout_ctx(f: &Fixture, name: &str, email: &str) -> FlowContext<CheckoutCtxData> {
    FlowContext::new(CheckoutCtxData::new(
      f.state.clone(),
      f.session.clone(),
      name.to_string(),
      email.to_string(),
    ))
  }

  async fn fill_cart(f: &Fixture) {
    f.state.carts.add_item(&f.session, 1, 2).await.unwrap();
    f.state.carts.add_item(&f.session, 2, 1).await.unwrap();
  }

  #[test]
  fn order_code_shape() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    let code = generate_order_code(date);
    assert!(code.starts_with("ORD-20240309-"));
    let suffix = &code["ORD-20240309-".len()..];
    assert_eq!(suffix.len(), ORDER_CODE_SUFFIX_LEN);
    assert!(suffix.bytes().all(|b| ORDER_CODE_ALPHABET.contains(&b)));
  }

  #[tokio::test]
  async fn checkout_snapshots_lines_and_clears_cart() {
    let f = fixture(Arc::new(crate::services::notifier::LogNotifier::new(std::time::Duration::ZERO)));
    fill_cart(&f).await;

    let ctx = checkout_ctx(&f, "  Ana ", "ana@example.com");
    let outcome = f.state.flows.run(ctx.clone()).await.unwrap();
    assert_eq!(outcome, FlowOutcome::Completed);

    let data = ctx.read();
    assert_eq!(data.total_cents, 6500);
    assert!(data.cart_cleared);
    assert!(data.notification_sent);

    let stored = f.orders.orders();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0.customer_name, "Ana");
    assert_eq!(stored[0].0.total_cents, 6500);
    assert_eq!(stored[0].1.len(), 2);
    drop(data);

    let view = f.state.carts.get_cart(&f.session).await.unwrap().unwrap();
    assert!(view.is_empty());
  }

  #[tokio::test]
  async fn empty_cart_creates_no_order() {
    let f = fixture(Arc::new(FailingNotifier));
    let err = f.state.flows.run(checkout_ctx(&f, "Ana", "ana@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));
    assert!(f.orders.orders().is_empty());
  }

  #[tokio::test]
  async fn blank_customer_details_are_rejected() {
    let f = fixture(Arc::new(FailingNotifier));
    fill_cart(&f).await;
    let err = f.state.flows.run(checkout_ctx(&f, "Ana", "   ")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(f.orders.orders().is_empty());
  }

  #[tokio::test]
  async fn failed_persistence_keeps_the_cart() {
    let f = fixture(Arc::new(FailingNotifier));
    fill_cart(&f).await;
    f.orders.set_unavailable(true);

    let err = f.state.flows.run(checkout_ctx(&f, "Ana", "ana@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    let view = f.state.carts.get_cart(&f.session).await.unwrap().unwrap();
    assert_eq!(view.lines.len(), 2);
    assert_eq!(view.total_cents(), 6500);
  }

  #[tokio::test]
  async fn code_collision_is_retried() {
    let f = fixture(Arc::new(FailingNotifier));
    fill_cart(&f).await;
    f.orders.reject_next_codes(2);

    let ctx = checkout_ctx(&f, "Ana", "ana@example.com");
    f.state.flows.run(ctx.clone()).await.unwrap();
    assert_eq!(ctx.read().code_attempts, 3);
    assert_eq!(f.orders.orders().len(), 1);
  }

  #[tokio::test]
  async fn exhausted_code_attempts_fail_without_clearing() {
    let f = fixture(Arc::new(FailingNotifier));
    fill_cart(&f).await;
    f.orders.reject_next_codes(MAX_ORDER_CODE_ATTEMPTS);

    let err = f.state.flows.run(checkout_ctx(&f, "Ana", "ana@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
    assert!(f.orders.orders().is_empty());
    let view = f.state.carts.get_cart(&f.session).await.unwrap().unwrap();
    assert_eq!(view.lines.len(), 2);
  }

  #[tokio::test]
  async fn notifier_failure_does_not_fail_checkout() {
    let f = fixture(Arc::new(FailingNotifier));
    fill_cart(&f).await;

    let ctx = checkout_ctx(&f, "Ana", "ana@example.com");
    let outcome = f.state.flows.run(ctx.clone()).await.unwrap();
    assert_eq!(outcome, FlowOutcome::Completed);
    assert!(!ctx.read().notification_sent);
    assert!(ctx.read().cart_cleared);
  }
}
