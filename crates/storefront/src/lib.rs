//! FSAD storefront library.
//!
//! Server-rendered checkout, order history and account header for the FSAD
//! e-commerce backend. The binary in `main.rs` only wires configuration and
//! telemetry around [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod components;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use middleware::session::SessionKeyError;
use state::AppState;

/// Static assets served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the storefront application with its full middleware stack.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// payment rate limiter can fall back to the peer address.
///
/// # Errors
///
/// Returns an error if the session secret cannot sign cookies.
pub fn app(state: AppState) -> Result<Router, SessionKeyError> {
    let session_layer = middleware::create_session_layer(state.config())?;

    Ok(Router::new()
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .route_service(
            fsad_core::PLACEHOLDER_IMAGE,
            ServeFile::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static/placeholder.svg")),
        )
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}
