//! Checkout error types.

use thiserror::Error;

use crate::backend::BackendError;

/// Shown when the backend gives no usable reason for a failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process your order. Please try again.";

/// Errors that end a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to pay for.
    #[error("cart is empty")]
    EmptyCart,

    /// The payment service answered but declined the charge.
    #[error("{0}")]
    PaymentDeclined(String),

    /// The payment went through but the order service refused the order.
    #[error("{0}")]
    OrderRejected(String),

    /// A backend call failed outright.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl CheckoutError {
    pub(super) fn payment_declined(message: Option<String>) -> Self {
        Self::PaymentDeclined(non_blank(message).unwrap_or_else(|| "Payment failed".to_string()))
    }

    pub(super) fn order_rejected(message: Option<String>) -> Self {
        Self::OrderRejected(
            non_blank(message).unwrap_or_else(|| "Order creation failed".to_string()),
        )
    }

    /// Text for the checkout error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::PaymentDeclined(message) | Self::OrderRejected(message) => message.clone(),
            Self::Backend(err) => err
                .backend_message()
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_string(),
            Self::EmptyCart => "Your cart is empty".to_string(),
        }
    }
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|m| !m.trim().is_empty())
}
