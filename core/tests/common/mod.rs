// tests/common/mod.rs
#![allow(dead_code)]

use cartflow::{FlowContext, FlowError, StepControl};
use once_cell::sync::Lazy;
use tracing::Level;

/// Stand-in for a checkout-like context: steps append to `steps_executed`
/// and add line amounts to `total_cents`.
#[derive(Clone, Debug, Default)]
pub struct DraftContext {
  pub total_cents: i64,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(format!("{:?}", e))
  }
}

/// Handler that records its step and adds `amount_cents` to the running total.
pub fn add_amount_handler(step_name: &'static str, amount_cents: i64) -> cartflow::Handler<DraftContext, TestError> {
  Box::new(move |ctx: FlowContext<DraftContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.total_cents += amount_cents;
      guard.steps_executed.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> cartflow::Handler<DraftContext, TestError> {
  Box::new(move |ctx: FlowContext<DraftContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
