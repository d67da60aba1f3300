// storefront/src/services/mod.rs

//! Collaborators of the cart and checkout flows, each behind a trait with a
//! Postgres and an in-memory implementation.

pub mod catalog;
pub mod notifier;
pub mod orders;
