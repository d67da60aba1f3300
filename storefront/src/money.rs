// storefront/src/money.rs

//! Integer-cent arithmetic for cart and order totals.
//!
//! Everything is `i64` cents; floating point never touches an amount.
//! Inputs are trusted to be validated (non-negative prices and quantities)
//! by the catalog and the cart store, so nothing here clamps.

/// Anything that contributes `quantity * unit price` to a total.
pub trait LineAmount {
  fn quantity(&self) -> i64;
  fn unit_price_cents(&self) -> i64;
}

/// A bare `(quantity, price)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedQuantity {
  pub quantity: i64,
  pub price_cents: i64,
}

impl LineAmount for PricedQuantity {
  fn quantity(&self) -> i64 {
    self.quantity
  }

  fn unit_price_cents(&self) -> i64 {
    self.price_cents
  }
}

pub fn line_total_cents<L: LineAmount + ?Sized>(line: &L) -> i64 {
  line.quantity() * line.unit_price_cents()
}

/// Sum of `quantity * unit price` over all lines; `0` for no lines.
pub fn calculate_cart_total<L: LineAmount>(items: &[L]) -> i64 {
  items.iter().map(line_total_cents).sum()
}

/// Number of units across all lines.
pub fn item_count<L: LineAmount>(items: &[L]) -> i64 {
  items.iter().map(LineAmount::quantity).sum()
}

/// Catalog price after the flat per-item discount, never below zero.
pub fn unit_price_cents(price_cents: i64, discount_cents: i64) -> i64 {
  (price_cents - discount_cents).max(0)
}

/// Renders cents as a plain decimal amount, e.g. `6500 -> "65.00"`.
pub fn format_cents(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
