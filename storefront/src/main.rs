// storefront/src/main.rs

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use storefront::config::{AppConfig, LogFormat};
use storefront::errors::AppError;
use storefront::services::catalog::seed_demo_products;
use storefront::session::issue_session_cookie;
use storefront::state::AppState;
use storefront::web::configure_app_routes;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
  std::io::Error::other(e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = AppConfig::from_env().map_err(|e| {
    eprintln!("Failed to load configuration: {}", e);
    startup_error(e)
  })?;
  init_tracing(app_config.log_format);
  tracing::info!("Starting storefront server...");

  let db_pool = PgPoolOptions::new()
    .max_connections(app_config.db_max_connections)
    .connect(&app_config.database_url)
    .await
    .map_err(|e| {
      tracing::error!(error = %e, "Failed to connect to the database.");
      startup_error(e)
    })?;
  tracing::info!("Connected to the database.");

  if app_config.run_migrations {
    sqlx::migrate!("./migrations").run(&db_pool).await.map_err(|e| {
      tracing::error!(error = %e, "Failed to run migrations.");
      startup_error(e)
    })?;
    tracing::info!("Migrations applied.");
  }

  if app_config.seed_db {
    seed_demo_products(&db_pool).await.map_err(|e: AppError| {
      tracing::error!(error = %e, "Failed to seed database.");
      startup_error(e)
    })?;
  }

  let server_address = app_config.server_address();
  let app_state = AppState::with_postgres(app_config, db_pool);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(from_fn(issue_session_cookie))
      .wrap(TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
