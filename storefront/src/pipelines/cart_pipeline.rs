// storefront/src/pipelines/cart_pipeline.rs

use cartflow::{FlowContext, FlowRegistry, Pipeline, StepControl};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;

pub fn build_add_to_cart_pipeline() -> Pipeline<AddToCartCtxData, AppError> {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("fetch_product_for_cart", false, None),
    ("check_product_stock_for_cart", false, None),
    ("add_or_increment_cart_item", false, None),
  ]);

  // Step 1: quantity bounds. `product_id` was already checked by the request parser.
  p.on_step("validate_cart_input", |ctx_data: FlowContext<AddToCartCtxData>| {
    Box::pin(async move {
      let (requested, max_quantity) = {
        let guard = ctx_data.read();
        (guard.requested_quantity, guard.app_state.config.max_quantity_per_item)
      };

      if requested < 1 {
        warn!(requested, "Add to Cart: rejected non-positive quantity.");
        return Err(AppError::Validation("qty must be at least 1".to_string()));
      }
      let quantity = i32::try_from(requested)
        .ok()
        .filter(|q| *q <= max_quantity)
        .ok_or_else(|| AppError::Validation(format!("qty cannot exceed {}", max_quantity)))?;

      ctx_data.write().quantity = quantity;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // Step 2: the product must exist in the catalog.
  p.on_step("fetch_product_for_cart", |ctx_data: FlowContext<AddToCartCtxData>| {
    Box::pin(async move {
      let (product_id, catalog) = {
        let guard = ctx_data.read();
        (guard.product_id, guard.app_state.catalog.clone())
      };

      let product = catalog.get_product(product_id).await?.ok_or_else(|| {
        warn!(product_id, "Add to Cart: product not found.");
        AppError::NotFound(format!("Product {} not found", product_id))
      })?;

      ctx_data.write().product = Some(product);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // Step 3: stock check. Informative only; stock is not reserved.
  p.on_step("check_product_stock_for_cart", |ctx_data: FlowContext<AddToCartCtxData>| {
    Box::pin(async move {
      let (quantity, stock) = {
        let guard = ctx_data.read();
        (guard.quantity, guard.product.as_ref().map(|p| p.stock))
      };
      let stock = stock.ok_or_else(|| AppError::Internal("product missing from add-to-cart context".to_string()))?;

      if stock < quantity {
        warn!(stock, quantity, "Add to Cart: insufficient stock.");
        return Err(AppError::Validation(format!(
          "Insufficient stock. Only {} available.",
          stock.max(0)
        )));
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // Step 4: atomic insert-or-increment in the store.
  p.on_step("add_or_increment_cart_item", |ctx_data: FlowContext<AddToCartCtxData>| {
    Box::pin(async move {
      let (session_id, product_id, quantity, carts) = {
        let guard = ctx_data.read();
        (
          guard.session_id.clone(),
          guard.product_id,
          guard.quantity,
          guard.app_state.carts.clone(),
        )
      };

      carts.add_item(&session_id, product_id, quantity).await?;
      info!(session = %session_id.short(), product_id, quantity, "Add to Cart: item added.");
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  p
}

pub fn register_add_to_cart_pipeline(registry: &FlowRegistry<AppError>) {
  registry.register(build_add_to_cart_pipeline());
  info!("Add to Cart pipeline registered.");
}
