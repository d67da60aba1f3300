// storefront/src/state.rs

use std::sync::Arc;

use cartflow::FlowRegistry;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::catalog::{PgProductCatalog, ProductCatalog};
use crate::services::notifier::{LogNotifier, OrderNotifier};
use crate::services::orders::{OrderStore, PgOrderStore};
use crate::store::{CartStore, PgCartStore};

/// Shared per-process state. Cloning is cheap; everything sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
  pub carts: Arc<dyn CartStore>,
  pub catalog: Arc<dyn ProductCatalog>,
  pub orders: Arc<dyn OrderStore>,
  pub notifier: Arc<dyn OrderNotifier>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the collaborators together and registers every pipeline.
  pub fn new(
    config: AppConfig,
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn OrderStore>,
    notifier: Arc<dyn OrderNotifier>,
  ) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows);
    Self {
      carts,
      catalog,
      orders,
      notifier,
      flows,
      config: Arc::new(config),
    }
  }

  /// Production wiring over a Postgres pool.
  pub fn with_postgres(config: AppConfig, pool: PgPool) -> Self {
    let carts = Arc::new(PgCartStore::new(pool.clone(), config.max_quantity_per_item));
    let catalog = Arc::new(PgProductCatalog::new(pool.clone()));
    let orders = Arc::new(PgOrderStore::new(pool));
    Self::new(config, carts, catalog, orders, Arc::new(LogNotifier::default()))
  }
}
