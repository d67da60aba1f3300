// cartflow/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps and their handlers in order.

use crate::core::context_data::FlowContext;
use crate::core::control::{FlowOutcome, StepControl};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use crate::pipeline::hooks::Phase;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx_data`.
  ///
  /// For each step: a true `skip_if` skips it; otherwise the `before`, `on`
  /// and `after` handlers run in registration order. A step without any
  /// handler fails the run with `FlowError::HandlerMissing` unless it is
  /// optional. The first handler error aborts the run and is returned as is.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: FlowContext<TData>) -> Result<FlowOutcome, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = info_span!("pipeline_step", step = step_name, index = step_idx);

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(parent: &step_span, Level::DEBUG, "Step skipped by condition.");
          continue;
        }
      }

      let has_handlers = Phase::ALL.iter().any(|p| !self.handlers(*p, step_name).is_empty());
      if !has_handlers {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      for phase in Phase::ALL {
        for handler in self.handlers(phase, step_name) {
          let control = handler(ctx_data.clone())
            .instrument(step_span.clone())
            .await
            .map_err(|e| {
              event!(parent: &step_span, Level::WARN, phase = phase.label(), error = %e, "Handler failed.");
              e
            })?;
          if control == StepControl::Stop {
            event!(parent: &step_span, Level::INFO, phase = phase.label(), "Pipeline stopped by handler.");
            return Ok(FlowOutcome::Stopped);
          }
        }
      }
    }

    Ok(FlowOutcome::Completed)
  }
}
