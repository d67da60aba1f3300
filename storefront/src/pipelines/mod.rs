// storefront/src/pipelines/mod.rs

//! Cart workflows expressed as `cartflow` pipelines.

use cartflow::FlowRegistry;

use crate::errors::AppError;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod contexts;

/// Registers every application pipeline. Called once while building `AppState`.
pub fn register_all_pipelines(registry: &FlowRegistry<AppError>) {
  cart_pipeline::register_add_to_cart_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry);
  tracing::info!("All application pipelines registered.");
}
