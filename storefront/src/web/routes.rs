// storefront/src/web/routes.rs

use actix_web::error::JsonPayloadError;
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, checkout_handlers};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "success": true, "status": "ok" }))
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(format!("Invalid request body: {}", err)).into()
}

/// Body extractor settings: malformed JSON becomes the uniform 400 body.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().limit(16 * 1024).error_handler(json_error_handler)
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(json_config())
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/cart")
        .route("", web::get().to(cart_handlers::get_cart_handler))
        .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
        .route("/remove", web::post().to(cart_handlers::remove_from_cart_handler))
        .route("/clear", web::post().to(cart_handlers::clear_cart_handler))
        .route("/checkout", web::post().to(checkout_handlers::checkout_handler)),
    );
}
