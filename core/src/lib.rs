// src/lib.rs

//! cartflow: a small async step-pipeline engine.
//!
//! A pipeline is an ordered list of named steps run over one shared context:
//!  - Each step can carry `before`, `on` and `after` handlers.
//!  - Handlers are async and may stop the pipeline early.
//!  - Steps can be optional or skipped by a condition on the context.
//!  - A type-keyed registry dispatches a context to the pipeline built for it.
//!
//! The storefront uses it for the add-to-cart and checkout workflows, where the
//! order of side effects matters (an order is persisted before the cart is cleared).

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::FlowContext;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;

/*
    Typical use:
    1. Define a context struct `MyCtx` holding the inputs and the slots steps fill in.
    2. Build `Pipeline::<MyCtx, MyError>::new(&[("step_a", false, None), ...])`.
    3. Attach handlers with `.on_step("step_a", |ctx| Box::pin(async move { ... }))`.
    4. Register it: `registry.register(pipeline)`.
    5. Per request: `registry.run(FlowContext::new(MyCtx { ... })).await?`, then read results from the context.
*/
