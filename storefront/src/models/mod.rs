// storefront/src/models/mod.rs

//! Data structures representing database rows and the views built from them.

pub mod cart;
pub mod cart_item;
pub mod order;
pub mod product;

pub use cart::{Cart, CartView};
pub use cart_item::{CartItem, CartLine};
pub use order::{NewOrder, Order, OrderLine, OrderStatus};
pub use product::Product;
