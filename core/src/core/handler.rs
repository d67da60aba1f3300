// cartflow/src/core/handler.rs

use crate::core::context_data::FlowContext;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by a handler.
pub type HandlerFuture<Err> = Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>;

/// A pipeline step handler.
///
/// Takes a clone of the run's `FlowContext<TData>` and resolves to `StepControl`
/// or the pipeline's error type. Lock guards taken on the context must be
/// dropped before the handler awaits anything.
pub type Handler<TData, Err> = Box<dyn Fn(FlowContext<TData>) -> HandlerFuture<Err> + Send + Sync>;
