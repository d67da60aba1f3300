// storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod checkout_handlers;

use cartflow::FlowOutcome;
use serde::Deserialize;
use tracing::warn;

use crate::errors::{AppError, Result};

/// None of the storefront pipelines stop early on purpose, so `Stopped` is a bug.
pub(crate) fn ensure_completed(outcome: FlowOutcome, flow: &str) -> Result<()> {
  match outcome {
    FlowOutcome::Completed => Ok(()),
    FlowOutcome::Stopped => {
      warn!(flow, "Pipeline was stopped by a handler.");
      Err(AppError::Internal(format!("{} was halted", flow)))
    }
  }
}

/// `productId` as sent by clients: a JSON integer or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductIdInput {
  Number(i64),
  Text(String),
}

impl ProductIdInput {
  pub fn parse(input: Option<&ProductIdInput>) -> Result<i64> {
    let input = input.ok_or_else(|| AppError::Validation("productId is required".to_string()))?;
    let id = match input {
      ProductIdInput::Number(n) => Some(*n),
      ProductIdInput::Text(s) => s.trim().parse::<i64>().ok(),
    };
    id.filter(|id| *id > 0)
      .ok_or_else(|| AppError::Validation("productId must be a positive integer".to_string()))
  }
}
