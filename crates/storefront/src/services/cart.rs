//! Session-held cart and checkout wizard state.
//!
//! Every visitor's cart lives under `session_keys::CART`; the wizard state
//! under `session_keys::CHECKOUT`. Missing or unreadable entries load as
//! empty so a stale cookie never breaks the page.

use fsad_core::{Cart, CartError, CartItem, Price, ProductId};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::backend::{BackendClient, BackendError};
use crate::models::{CheckoutState, Confirmation, session_keys};

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Errors from adding a product to the cart.
#[derive(Debug, Error)]
pub enum AddToCartError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Session(#[from] tower_sessions::session::Error),
}

/// Load the visitor's cart.
pub async fn load_cart(session: &Session) -> Cart {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => cart.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Failed to read cart from session");
            Cart::new()
        }
    }
}

/// Store the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> SessionResult<()> {
    session.insert(session_keys::CART, cart).await
}

/// Load the checkout wizard state.
pub async fn load_checkout(session: &Session) -> CheckoutState {
    match session.get::<CheckoutState>(session_keys::CHECKOUT).await {
        Ok(state) => state.unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "Failed to read checkout state from session");
            CheckoutState::default()
        }
    }
}

/// Store the checkout wizard state.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_checkout(session: &Session, state: &CheckoutState) -> SessionResult<()> {
    session.insert(session_keys::CHECKOUT, state).await
}

/// Store the checkout wizard state and write the session through to the
/// store before the request ends, so concurrent requests see it.
///
/// # Errors
///
/// Returns an error if the session cannot be modified or saved.
pub async fn save_checkout_now(session: &Session, state: &CheckoutState) -> SessionResult<()> {
    session.insert(session_keys::CHECKOUT, state).await?;
    session.save().await
}

/// Empty the cart and reset the wizard after a placed order, stashing the
/// confirmation for the next page view.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn finish_checkout(session: &Session, confirmation: &Confirmation) -> SessionResult<()> {
    session.remove_value(session_keys::CART).await?;
    session.remove_value(session_keys::CHECKOUT).await?;
    session.insert(session_keys::CONFIRMATION, confirmation).await
}

/// Take the confirmation stashed by `finish_checkout`.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_confirmation(session: &Session) -> SessionResult<Option<Confirmation>> {
    session.remove(session_keys::CONFIRMATION).await
}

/// Add `quantity` of a catalog product to the visitor's cart.
///
/// Price, name and stock come from the backend so the cart never trusts
/// client-supplied values. Returns the resulting line quantity.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded, is out of stock, or
/// the session cannot be modified.
#[instrument(skip(backend, session))]
pub async fn add_product(
    backend: &BackendClient,
    session: &Session,
    product_id: &ProductId,
    quantity: u32,
) -> Result<u32, AddToCartError> {
    let product = backend.get_product(product_id).await?;

    let mut cart = load_cart(session).await;
    let price = Price::usd(product.price);
    let line_quantity = cart.add(
        CartItem {
            product_id: product.id,
            name: product.name,
            price,
            quantity,
            stock: product.stock,
            image: product.image,
        },
        quantity,
    )?;
    save_cart(session, &cart).await?;

    Ok(line_quantity)
}
