//! Cart route handlers.
//!
//! Plain form posts that mutate the session cart and redirect back to the
//! page that submitted them.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use fsad_core::{ProductId, QuantityChange};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::services::cart::{self as cart_store, AddToCartError};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Quantity change form data.
///
/// Signed so a decrement below one arrives intact and removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

fn dashboard_with(key: &str, message: &str) -> Redirect {
    Redirect::to(&format!(
        "/dashboard?{key}={}",
        urlencoding::encode(message)
    ))
}

/// Add a catalog product to the cart and return to the catalog.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);

    match cart_store::add_product(state.backend(), &session, &form.product_id, quantity).await {
        Ok(line_quantity) => {
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", &form.product_id.to_string())]),
            );
            debug!(line_quantity, "Product added to cart");
            Ok(dashboard_with("success", "Added to cart").into_response())
        }
        Err(AddToCartError::Cart(err)) => {
            Ok(dashboard_with("error", &capitalize(&err.to_string())).into_response())
        }
        Err(AddToCartError::Backend(err)) if err.is_not_found() => {
            Ok(dashboard_with("error", "Product not found").into_response())
        }
        Err(AddToCartError::Backend(err)) => {
            warn!(error = %err, "Failed to load product for cart");
            Ok(dashboard_with("error", "Failed to add to cart. Please try again.").into_response())
        }
        Err(AddToCartError::Session(err)) => Err(AppError::Session(err)),
    }
}

/// Change a line quantity from the cart review step.
///
/// Below one removes the line; above stock leaves it unchanged.
#[instrument(skip_all)]
pub async fn update_quantity(
    RequireAuth(_user): RequireAuth,
    session: Session,
    Form(form): Form<UpdateQuantityForm>,
) -> Result<Redirect> {
    let mut cart = cart_store::load_cart(&session).await;

    match cart.change_quantity(&form.product_id, form.quantity) {
        QuantityChange::Updated | QuantityChange::Removed => {
            cart_store::save_cart(&session, &cart).await?;
        }
        QuantityChange::Ignored => debug!("Quantity change ignored"),
    }

    Ok(Redirect::to("/checkout"))
}

/// Remove a line from the cart review step.
#[instrument(skip_all)]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let mut cart = cart_store::load_cart(&session).await;

    if cart.remove(&form.product_id) {
        cart_store::save_cart(&session, &cart).await?;
    }

    Ok(Redirect::to("/checkout"))
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
