// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use cartflow::FlowContext;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{ensure_completed, ProductIdInput};
use crate::errors::AppError;
use crate::models::CartLine;
use crate::money::{self, LineAmount};
use crate::pipelines::contexts::AddToCartCtxData;
use crate::session::CartSession;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
  pub product_id: Option<ProductIdInput>,
  pub qty: Option<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
  pub product_id: Option<ProductIdInput>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
  pub item_id: Uuid,
  pub product_id: i64,
  pub name: String,
  pub image_url: Option<String>,
  pub price_cents: i64,
  pub discount_cents: i64,
  pub unit_price_cents: i64,
  pub quantity: i32,
  pub line_total_cents: i64,
  pub stock: i32,
}

impl From<&CartLine> for CartLineResponse {
  fn from(line: &CartLine) -> Self {
    Self {
      item_id: line.item_id,
      product_id: line.product_id,
      name: line.name.clone(),
      image_url: line.image_url.clone(),
      price_cents: line.price_cents,
      discount_cents: line.discount_cents,
      unit_price_cents: line.unit_price_cents(),
      quantity: line.quantity,
      line_total_cents: money::line_total_cents(line),
      stock: line.stock,
    }
  }
}

#[instrument(name = "handler::get_cart", skip_all, fields(session = %session.id.short()))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let body = match app_state.carts.get_cart(&session.id).await? {
    Some(view) => {
      let items: Vec<CartLineResponse> = view.lines.iter().map(CartLineResponse::from).collect();
      json!({
        "success": true,
        "cart": view.cart,
        "items": items,
        "totalCents": view.total_cents(),
        "itemCount": view.item_count(),
      })
    }
    None => json!({
      "success": true,
      "cart": null,
      "items": [],
      "totalCents": 0,
      "itemCount": 0,
    }),
  };
  Ok(HttpResponse::Ok().json(body))
}

#[instrument(name = "handler::add_to_cart", skip_all, fields(session = %session.id.short()))]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  session: CartSession,
  req_payload: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
  let product_id = ProductIdInput::parse(req_payload.product_id.as_ref())?;
  let requested_quantity = req_payload.qty.unwrap_or(1);

  let ctx = FlowContext::new(AddToCartCtxData::new(
    app_state.get_ref().clone(),
    session.id.clone(),
    product_id,
    requested_quantity,
  ));
  let outcome = app_state.flows.run(ctx).await?;
  ensure_completed(outcome, "add to cart")?;

  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[instrument(name = "handler::remove_from_cart", skip_all, fields(session = %session.id.short()))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  session: CartSession,
  req_payload: web::Json<RemoveFromCartRequest>,
) -> Result<HttpResponse, AppError> {
  let product_id = ProductIdInput::parse(req_payload.product_id.as_ref())?;
  let removed = app_state.carts.remove_item(&session.id, product_id).await?;
  info!(product_id, removed, "Removed cart line.");
  Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[instrument(name = "handler::clear_cart", skip_all, fields(session = %session.id.short()))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  session: CartSession,
) -> Result<HttpResponse, AppError> {
  let removed = app_state.carts.clear_cart(&session.id).await?;
  info!(removed, "Cleared cart.");
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "itemCount": 0,
    "totalCents": 0,
  })))
}
