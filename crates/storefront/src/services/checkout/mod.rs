//! Checkout service.
//!
//! Places an order for the session cart: charge first, then create the
//! order referencing the transaction. A failure after the charge leaves the
//! payment captured; the order service owns reconciliation.

mod error;

pub use error::{CheckoutError, GENERIC_FAILURE_MESSAGE};

use fsad_core::{Cart, ShippingForm, ValidatedPayment};
use tracing::{info, instrument, warn};

use crate::backend::{BackendClient, CreateOrderRequest, OrderLineRequest, PaymentRequest};
use crate::models::Confirmation;

/// Outcome of a successful checkout.
pub type PlacedOrder = Confirmation;

/// Checkout service.
pub struct CheckoutService<'a> {
    backend: &'a BackendClient,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Charge the cart total and create the order.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::PaymentDeclined` or `OrderRejected` when the
    /// backend answers `success: false`, and `Backend` for transport or
    /// HTTP-level failures.
    #[instrument(skip_all, fields(items = cart.items().len(), method = %payment.payment_method))]
    pub async fn place_order(
        &self,
        access_token: &str,
        cart: &Cart,
        shipping: &ShippingForm,
        payment: &ValidatedPayment,
    ) -> Result<PlacedOrder, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let amount = cart.totals().total.amount;
        let payment_response = self
            .backend
            .process_payment(access_token, &PaymentRequest::new(amount, payment))
            .await?;

        if !payment_response.success {
            warn!("Payment declined");
            return Err(CheckoutError::payment_declined(payment_response.message));
        }

        let transaction_id = payment_response.transaction_id.unwrap_or_default();
        info!(%transaction_id, %amount, "Payment captured");

        let request = order_request(cart, shipping, payment, &transaction_id);
        let order_response = self.backend.create_order(access_token, &request).await?;

        if !order_response.success {
            warn!(%transaction_id, "Order rejected after payment");
            return Err(CheckoutError::order_rejected(order_response.message));
        }

        info!(
            %transaction_id,
            order_id = ?order_response.order.as_ref().and_then(|o| o.id.as_ref()),
            "Order created"
        );

        Ok(Confirmation {
            order: order_response.order,
            transaction_id,
        })
    }
}

/// Build the order-service request for a paid cart.
fn order_request(
    cart: &Cart,
    shipping: &ShippingForm,
    payment: &ValidatedPayment,
    transaction_id: &str,
) -> CreateOrderRequest {
    CreateOrderRequest {
        items: cart
            .items()
            .iter()
            .map(|item| OrderLineRequest {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            })
            .collect(),
        shipping_address: shipping.to_address(),
        payment_method: payment.payment_method,
        transaction_id: transaction_id.to_string(),
    }
}
