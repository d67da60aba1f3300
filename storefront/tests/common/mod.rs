// storefront/tests/common/mod.rs

use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;

use storefront::config::AppConfig;
use storefront::services::catalog::InMemoryCatalog;
use storefront::services::notifier::LogNotifier;
use storefront::services::orders::InMemoryOrderStore;
use storefront::state::AppState;
use storefront::store::InMemoryCartStore;

pub const COOKIE_NAME: &str = "cart_session";

static TRACING: Lazy<()> = Lazy::new(|| {
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

/// App state over in-memory collaborators, with handles kept for assertions.
pub struct TestShop {
  pub state: AppState,
  pub catalog: Arc<InMemoryCatalog>,
  pub carts: Arc<InMemoryCartStore>,
  pub orders: Arc<InMemoryOrderStore>,
}

pub fn test_shop() -> TestShop {
  setup_tracing();
  let config = AppConfig {
    database_url: "postgres://unused".to_string(),
    ..AppConfig::default()
  };

  let catalog = Arc::new(InMemoryCatalog::new());
  catalog.insert_product(1, "Kopi Susu", 1500, 0, 50);
  catalog.insert_product(2, "Roti Bakar", 3500, 0, 50);
  catalog.insert_product(3, "Kue Lapis", 2000, 0, 1);

  let carts = Arc::new(InMemoryCartStore::new(catalog.clone(), config.max_quantity_per_item));
  let orders = Arc::new(InMemoryOrderStore::new());
  let state = AppState::new(
    config,
    carts.clone(),
    catalog.clone(),
    orders.clone(),
    Arc::new(LogNotifier::new(Duration::ZERO)),
  );

  TestShop {
    state,
    catalog,
    carts,
    orders,
  }
}
