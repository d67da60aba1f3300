// storefront/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use cartflow::FlowContext;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::ensure_completed;
use crate::errors::AppError;
use crate::pipelines::contexts::CheckoutCtxData;
use crate::session::CartSession;
use crate::state::AppState;

/// Missing fields deserialize as empty and are rejected by the pipeline.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
  #[serde(default)]
  pub customer_name: String,
  #[serde(default)]
  pub customer_email: String,
}

#[instrument(name = "handler::checkout", skip_all, fields(session = %session.id.short()))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  session: CartSession,
  req_payload: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
  let CheckoutRequest {
    customer_name,
    customer_email,
  } = req_payload.into_inner();

  let ctx = FlowContext::new(CheckoutCtxData::new(
    app_state.get_ref().clone(),
    session.id.clone(),
    customer_name,
    customer_email,
  ));
  let outcome = app_state.flows.run(ctx.clone()).await?;
  ensure_completed(outcome, "checkout")?;

  let (order_code, total_cents) = {
    let guard = ctx.read();
    let order = guard
      .order
      .as_ref()
      .ok_or_else(|| AppError::Internal("checkout completed without an order".to_string()))?;
    (order.order_code.clone(), order.total_cents)
  };
  info!(%order_code, total_cents, "Checkout completed.");

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "orderCode": order_code,
    "totalCents": total_cents,
  })))
}
