// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

pub const DEFAULT_MAX_QUANTITY_PER_ITEM: i32 = 9999;
/// Highest accepted `MAX_QUANTITY_PER_ITEM`; two capped lines still sum inside `i32`.
pub const MAX_QUANTITY_PER_ITEM_LIMIT: i32 = i32::MAX / 2;
/// Accepted range for `SESSION_MAX_AGE_DAYS` (ten years at most).
pub const SESSION_MAX_AGE_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" | "text" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(AppError::Config(format!("Invalid LOG_FORMAT '{}': expected pretty or json", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub db_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,

  pub session_cookie_name: String,
  pub session_cookie_secure: bool,
  pub session_max_age_days: i64,

  /// Upper bound for one cart line, enforced atomically by the cart store.
  pub max_quantity_per_item: i32,

  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: String::new(),
      db_max_connections: 10,
      run_migrations: true,
      seed_db: false,
      session_cookie_name: "cart_session".to_string(),
      session_cookie_secure: false,
      session_max_age_days: 30,
      max_quantity_per_item: DEFAULT_MAX_QUANTITY_PER_ITEM,
      log_format: LogFormat::Pretty,
    }
  }
}

/// Parses `var_name` if set, otherwise returns `default`.
fn parse_or<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", var_name, e))),
    Err(_) => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let defaults = Self::default();

    let database_url = env::var("DATABASE_URL")
      .map_err(|e| AppError::Config(format!("Missing environment variable 'DATABASE_URL': {}", e)))?;

    let max_quantity_per_item = parse_or("MAX_QUANTITY_PER_ITEM", defaults.max_quantity_per_item)?;
    if !(1..=MAX_QUANTITY_PER_ITEM_LIMIT).contains(&max_quantity_per_item) {
      return Err(AppError::Config(format!(
        "MAX_QUANTITY_PER_ITEM must be between 1 and {}",
        MAX_QUANTITY_PER_ITEM_LIMIT
      )));
    }

    let session_max_age_days = parse_or("SESSION_MAX_AGE_DAYS", defaults.session_max_age_days)?;
    if !SESSION_MAX_AGE_DAYS_RANGE.contains(&session_max_age_days) {
      return Err(AppError::Config(format!(
        "SESSION_MAX_AGE_DAYS must be between {} and {}",
        SESSION_MAX_AGE_DAYS_RANGE.start(),
        SESSION_MAX_AGE_DAYS_RANGE.end()
      )));
    }

    let session_cookie_name = env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.session_cookie_name);
    if session_cookie_name.trim().is_empty() {
      return Err(AppError::Config("SESSION_COOKIE_NAME must not be empty".to_string()));
    }

    let config = Self {
      server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
      server_port: parse_or("SERVER_PORT", defaults.server_port)?,
      database_url,
      db_max_connections: parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
      run_migrations: parse_or("RUN_MIGRATIONS", defaults.run_migrations)?,
      seed_db: parse_or("SEED_DB", defaults.seed_db)?,
      session_cookie_name,
      session_cookie_secure: parse_or("SESSION_COOKIE_SECURE", defaults.session_cookie_secure)?,
      session_max_age_days,
      max_quantity_per_item,
      log_format: parse_or("LOG_FORMAT", defaults.log_format)?,
    };

    tracing::info!("Application configuration loaded successfully.");
    Ok(config)
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: &[&str] = &[
    "DATABASE_URL",
    "SERVER_PORT",
    "SEED_DB",
    "MAX_QUANTITY_PER_ITEM",
    "LOG_FORMAT",
    "SESSION_COOKIE_NAME",
    "SESSION_MAX_AGE_DAYS",
  ];

  fn clear_vars() {
    for v in VARS {
      env::remove_var(v);
    }
  }

  #[test]
  #[serial]
  fn applies_defaults_when_only_database_url_is_set() {
    clear_vars();
    env::set_var("DATABASE_URL", "postgres://localhost/storefront_test");
    let cfg = AppConfig::from_env().expect("config");
    assert_eq!(cfg.server_port, 8080);
    assert_eq!(cfg.session_cookie_name, "cart_session");
    assert_eq!(cfg.max_quantity_per_item, DEFAULT_MAX_QUANTITY_PER_ITEM);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
    assert!(!cfg.seed_db);
    clear_vars();
  }

  #[test]
  #[serial]
  fn rejects_bad_values() {
    clear_vars();
    env::set_var("DATABASE_URL", "postgres://localhost/storefront_test");
    env::set_var("SERVER_PORT", "eighty");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(m)) if m.contains("SERVER_PORT")));

    env::remove_var("SERVER_PORT");
    env::set_var("MAX_QUANTITY_PER_ITEM", "0");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(_))));

    env::set_var("MAX_QUANTITY_PER_ITEM", i32::MAX.to_string());
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(m)) if m.contains("MAX_QUANTITY_PER_ITEM")));

    env::set_var("MAX_QUANTITY_PER_ITEM", MAX_QUANTITY_PER_ITEM_LIMIT.to_string());
    assert_eq!(AppConfig::from_env().expect("config").max_quantity_per_item, MAX_QUANTITY_PER_ITEM_LIMIT);

    env::remove_var("MAX_QUANTITY_PER_ITEM");
    for bad_age in ["-1", "0", "3651", "9223372036854775807"] {
      env::set_var("SESSION_MAX_AGE_DAYS", bad_age);
      assert!(
        matches!(AppConfig::from_env(), Err(AppError::Config(m)) if m.contains("SESSION_MAX_AGE_DAYS")),
        "accepted SESSION_MAX_AGE_DAYS={}",
        bad_age
      );
    }
    env::set_var("SESSION_MAX_AGE_DAYS", "3650");
    assert_eq!(AppConfig::from_env().expect("config").session_max_age_days, 3650);

    env::remove_var("SESSION_MAX_AGE_DAYS");
    env::set_var("LOG_FORMAT", "xml");
    assert!(matches!(AppConfig::from_env(), Err(AppError::Config(m)) if m.contains("LOG_FORMAT")));
    clear_vars();
  }

  #[test]
  fn log_format_parses_case_insensitively() {
    assert_eq!("JSON".parse::<LogFormat>().ok(), Some(LogFormat::Json));
    assert_eq!(" pretty ".parse::<LogFormat>().ok(), Some(LogFormat::Pretty));
  }
}
