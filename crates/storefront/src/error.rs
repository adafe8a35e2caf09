//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Checkout failures are not routed through here;
//! the wizard shows them in its own banner.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::BackendError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Session store could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Self::Backend(err) if err.is_unauthorized() => StatusCode::UNAUTHORIZED,
            Self::Backend(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) => "Internal server error",
            Self::Backend(err) if err.is_not_found() => "Not found",
            Self::Backend(err) if err.is_unauthorized() => "Please sign in again",
            Self::Backend(_) => "External service error",
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in customer.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Drop query strings from the request attached to a Sentry event.
///
/// Installed as `before_send`; the sign-in handoff URL carries an access
/// token in its query.
#[must_use]
#[allow(clippy::unnecessary_wraps)]
pub fn strip_request_query(
    mut event: sentry::protocol::Event<'static>,
) -> Option<sentry::protocol::Event<'static>> {
    if let Some(request) = event.request.as_mut() {
        request.query_string = None;
        if let Some(url) = request.url.as_mut() {
            url.set_query(None);
        }
    }
    Some(event)
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Shipping saved", Some(&[("step", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_sentry_events_lose_query_strings() {
        let event = sentry::protocol::Event {
            request: Some(sentry::protocol::Request {
                url: "https://shop.example.org/auth/handoff?token=secret-access-token"
                    .parse()
                    .ok(),
                query_string: Some("token=secret-access-token".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let request = strip_request_query(event)
            .and_then(|e| e.request)
            .expect("request is kept");
        assert_eq!(request.query_string, None);
        assert_eq!(
            request.url.map(|u| u.to_string()).as_deref(),
            Some("https://shop.example.org/auth/handoff")
        );
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Backend(BackendError::Api {
            status: 500,
            message: None,
        });
        assert_eq!(err.to_string(), "Backend error: API error: 500");
    }

    #[test]
    fn test_backend_errors_map_to_gateway_statuses() {
        let api = |status| {
            AppError::Backend(BackendError::Api {
                status,
                message: None,
            })
        };
        assert_eq!(get_status(api(404)), StatusCode::NOT_FOUND);
        assert_eq!(get_status(api(401)), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(api(503)), StatusCode::BAD_GATEWAY);
    }
}
