//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the catalog
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (backend reachable)
//!
//! # Catalog
//! GET  /dashboard              - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart (form posts, redirect back)
//! POST /cart/add               - Add to cart, back to the catalog
//! POST /cart/quantity          - Change a line quantity, back to checkout
//! POST /cart/remove            - Remove a line, back to checkout
//!
//! # Checkout wizard
//! GET  /checkout               - Current step
//! POST /checkout/cart          - Cart review -> shipping
//! POST /checkout/shipping      - Validate and store shipping -> payment
//! POST /checkout/back/cart     - Back to cart review
//! POST /checkout/back/shipping - Back to shipping (pre-filled)
//! POST /checkout/error/dismiss - Hide the error banner
//! POST /checkout/payment       - Pay and place the order (rate limited)
//! GET  /order-confirmation     - Placed order summary (shown once)
//!
//! # Orders
//! GET  /orders?status=&expanded= - Order history
//!
//! # Auth (credentials are checked by the external auth service)
//! GET  /login                  - Local sign-in page (token hand-off form)
//! GET  /auth/handoff?token=    - Exchange an access token for a session
//! POST /auth/logout            - End the session
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod orders;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::payment_rate_limiter;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/quantity", post(cart::update_quantity))
        .route("/remove", post(cart::remove))
}

/// Create the checkout wizard routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/cart", post(checkout::continue_to_shipping))
        .route("/shipping", post(checkout::submit_shipping))
        .route("/back/cart", post(checkout::back_to_cart))
        .route("/back/shipping", post(checkout::back_to_shipping))
        .route("/error/dismiss", post(checkout::dismiss_error))
        .route(
            "/payment",
            post(checkout::submit_payment).layer(payment_rate_limiter()),
        )
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/handoff", get(auth::handoff))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Catalog
        .route("/dashboard", get(catalog::dashboard))
        .route("/products/{id}", get(catalog::product))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        .route("/order-confirmation", get(checkout::confirmation))
        // Orders
        .route("/orders", get(orders::index))
        // Auth
        .route("/login", get(auth::login_page))
        .nest("/auth", auth_routes())
}
