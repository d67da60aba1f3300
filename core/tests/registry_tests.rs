// tests/registry_tests.rs
mod common;

use cartflow::{FlowContext, FlowError, FlowOutcome, FlowRegistry, Pipeline, StepControl};
use common::*;

#[derive(Clone, Debug, Default)]
struct AddCtx {
  qty: i64,
}

#[derive(Clone, Debug, Default)]
struct CheckoutCtx {
  order_code: Option<String>,
}

fn registry_with_two_pipelines() -> FlowRegistry<TestError> {
  let registry = FlowRegistry::<TestError>::new();

  let mut add = Pipeline::<AddCtx, TestError>::new(&[("increment", false, None)]);
  add.on_step("increment", |ctx: FlowContext<AddCtx>| {
    Box::pin(async move {
      ctx.write().qty += 1;
      Ok::<_, TestError>(StepControl::Continue)
    })
  });
  registry.register(add);

  let mut checkout = Pipeline::<CheckoutCtx, TestError>::new(&[("code", false, None)]);
  checkout.on_step("code", |ctx: FlowContext<CheckoutCtx>| {
    Box::pin(async move {
      ctx.write().order_code = Some("ORD-TEST".to_string());
      Ok::<_, TestError>(StepControl::Continue)
    })
  });
  registry.register(checkout);

  registry
}

#[tokio::test]
async fn dispatches_by_context_type() {
  setup_tracing();
  let registry = registry_with_two_pipelines();
  assert!(registry.is_registered::<AddCtx>());
  assert!(registry.is_registered::<CheckoutCtx>());

  let add_ctx = FlowContext::new(AddCtx { qty: 1 });
  assert_eq!(registry.run(add_ctx.clone()).await, Ok(FlowOutcome::Completed));
  assert_eq!(add_ctx.read().qty, 2);

  let checkout_ctx = FlowContext::new(CheckoutCtx::default());
  assert_eq!(registry.run(checkout_ctx.clone()).await, Ok(FlowOutcome::Completed));
  assert_eq!(checkout_ctx.read().order_code.as_deref(), Some("ORD-TEST"));
}

#[tokio::test]
async fn unregistered_context_is_an_error() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  let result = registry.run(FlowContext::new(AddCtx::default())).await;
  match result {
    Err(TestError::Flow(s)) => assert!(s.contains("NotRegistered")),
    other => panic!("expected NotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn handler_errors_pass_through_registry() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();
  let mut p = Pipeline::<DraftContext, TestError>::new(&[("persist", false, None)]);
  p.on_step("persist", failing_handler("persist", "duplicate order code"));
  registry.register(p);

  let result = registry.run(FlowContext::new(DraftContext::default())).await;
  assert_eq!(result, Err(TestError::Handler("duplicate order code".to_string())));
}

#[tokio::test]
async fn default_registry_uses_flow_error() {
  setup_tracing();
  let registry: FlowRegistry = FlowRegistry::default();
  let result = registry.run(FlowContext::new(CheckoutCtx::default())).await;
  assert!(matches!(result, Err(FlowError::NotRegistered { .. })));
}
