// storefront/src/services/notifier.rs

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::models::{Order, OrderLine};
use crate::money;

/// Tells the shop about a new order. Delivery is best effort.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
  async fn order_placed(&self, order: &Order, lines: &[OrderLine]) -> anyhow::Result<()>;
}

/// Stand-in for a chat gateway: renders the message and logs it.
pub struct LogNotifier {
  latency: Duration,
}

impl LogNotifier {
  pub fn new(latency: Duration) -> Self {
    Self { latency }
  }
}

impl Default for LogNotifier {
  fn default() -> Self {
    Self::new(Duration::from_millis(20))
  }
}

pub fn render_order_message(order: &Order, lines: &[OrderLine]) -> String {
  let mut msg = format!("*New order {}*\n", order.order_code);
  msg.push_str(&format!("Customer: {} <{}>\n", order.customer_name, order.customer_email));
  for line in lines {
    msg.push_str(&format!(
      "- {} x{} @ {} = {}\n",
      line.name,
      line.quantity,
      money::format_cents(line.unit_price_cents),
      money::format_cents(money::line_total_cents(line)),
    ));
  }
  msg.push_str(&format!("Total: {}", money::format_cents(order.total_cents)));
  msg
}

#[async_trait]
impl OrderNotifier for LogNotifier {
  async fn order_placed(&self, order: &Order, lines: &[OrderLine]) -> anyhow::Result<()> {
    tokio::time::sleep(self.latency).await;
    let message = render_order_message(order, lines);
    info!(order_code = %order.order_code, "Simulated order notification:\n{}", message);
    Ok(())
  }
}
