// storefront/src/lib.rs

//! Session-keyed shopping cart and checkout over HTTP.
//!
//! Carts live in Postgres keyed by an opaque session cookie. Add-to-cart and
//! checkout run as `cartflow` pipelines; the remaining cart operations call
//! the `CartStore` directly.

pub mod config;
pub mod errors;
pub mod models;
pub mod money;
pub mod pipelines;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
pub mod web;
