// storefront/src/services/catalog.rs

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::models::Product;

/// Read-only view of the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
  async fn get_product(&self, product_id: i64) -> Result<Option<Product>>;
}

#[derive(Clone)]
pub struct PgProductCatalog {
  pool: PgPool,
}

impl PgProductCatalog {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
  #[instrument(name = "PgProductCatalog::get_product", skip(self))]
  async fn get_product(&self, product_id: i64) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
      "SELECT id, name, price_cents, discount_cents, image_url, stock FROM products WHERE id = $1",
    )
    .bind(product_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(product)
  }
}

/// Inserts a handful of demo products when the table is empty.
pub async fn seed_demo_products(pool: &PgPool) -> Result<u64> {
  let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products").fetch_one(pool).await?;
  if existing > 0 {
    info!(existing, "Products table already populated, skipping seed.");
    return Ok(0);
  }

  let demo: [(&str, i64, i64, i32); 4] = [
    ("Kopi Susu Gula Aren", 1500, 0, 120),
    ("Roti Bakar Cokelat", 3500, 0, 40),
    ("Nasi Goreng Spesial", 4200, 700, 25),
    ("Es Teh Manis", 800, 0, 300),
  ];

  let mut inserted = 0;
  for (name, price_cents, discount_cents, stock) in demo {
    inserted += sqlx::query(
      "INSERT INTO products (name, price_cents, discount_cents, stock) VALUES ($1, $2, $3, $4)",
    )
    .bind(name)
    .bind(price_cents)
    .bind(discount_cents)
    .bind(stock)
    .execute(pool)
    .await?
    .rows_affected();
  }
  info!(inserted, "Seeded demo products.");
  Ok(inserted)
}

#[derive(Default)]
pub struct InMemoryCatalog {
  products: RwLock<HashMap<i64, Product>>,
}

impl InMemoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_product(&self, id: i64, name: &str, price_cents: i64, discount_cents: i64, stock: i32) {
    self.products.write().insert(
      id,
      Product {
        id,
        name: name.to_string(),
        price_cents,
        discount_cents,
        image_url: None,
        stock,
      },
    );
  }

  pub fn set_price(&self, id: i64, price_cents: i64, discount_cents: i64) {
    if let Some(product) = self.products.write().get_mut(&id) {
      product.price_cents = price_cents;
      product.discount_cents = discount_cents;
    }
  }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
  async fn get_product(&self, product_id: i64) -> Result<Option<Product>> {
    Ok(self.products.read().get(&product_id).cloned())
  }
}
