// tests/error_handling_tests.rs
mod common;

use cartflow::{FlowContext, FlowError, FlowOutcome, FlowResult, Pipeline, StepControl};
use common::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn required_step_without_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<DraftContext, TestError>::new(&[("persist", false, None)]);
  let result = pipeline.run(FlowContext::new(DraftContext::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("persist"));
    }
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn pipeline_can_use_flow_error_directly() {
  setup_tracing();
  let mut pipeline = Pipeline::<DraftContext, FlowError>::new(&[("task", false, None)]);
  pipeline.on_step("task", |_ctx: FlowContext<DraftContext>| {
    Box::pin(async move { Err::<StepControl, _>(anyhow::anyhow!("catalog timeout")) })
  });

  let result = pipeline.run(FlowContext::new(DraftContext::default())).await;
  match result {
    Err(FlowError::HandlerError { source }) => assert_eq!(source.to_string(), "catalog timeout"),
    other => panic!("expected HandlerError, got {:?}", other),
  }
}

#[test]
#[should_panic(expected = "not defined in this pipeline")]
fn registering_on_unknown_step_panics() {
  let mut pipeline = Pipeline::<DraftContext, TestError>::new(&[("load", false, None)]);
  pipeline.on_step("lod", add_amount_handler("lod", 0));
}

#[tokio::test]
#[serial]
async fn internal_errors_are_returned_unchanged() {
  setup_tracing();
  let mut pipeline = Pipeline::<DraftContext, FlowError>::new(&[("task", false, None), ("after", false, None)]);
  pipeline.on_step("task", |_ctx: FlowContext<DraftContext>| {
    Box::pin(async move { Err::<StepControl, _>(FlowError::Internal("ledger out of sync".to_string())) })
  });
  pipeline.on_step("after", |ctx: FlowContext<DraftContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push("after".to_string());
      Ok::<_, FlowError>(StepControl::Continue)
    })
  });

  let ctx = FlowContext::new(DraftContext::default());
  let result: FlowResult<FlowOutcome> = pipeline.run(ctx.clone()).await;
  match result {
    Err(FlowError::Internal(msg)) => assert_eq!(msg, "ledger out of sync"),
    other => panic!("expected Internal, got {:?}", other),
  }
  assert!(ctx.read().steps_executed.is_empty());
}
