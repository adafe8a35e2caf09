//! Request and response bodies of the backend API.
//!
//! Field names follow the backend's camelCase JSON.

use std::fmt;

use fsad_core::{
    Order, PaymentMethod, ProductId, ShippingAddress, ValidatedPayment, price::format_amount,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Error body returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Auth
// =============================================================================

/// User profile behind an access token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendUser {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Response of `GET /auth/me`.
#[derive(Debug, Default, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<BackendUser>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Product {
    /// Price with two decimals, no symbol.
    #[must_use]
    pub fn price_string(&self) -> String {
        format_amount(self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Response of `GET /products`.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsResponse {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Response of `GET /products/{id}`.
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

// =============================================================================
// Payments
// =============================================================================

/// Card details sent to the payment service.
///
/// `Debug` redacts the card number and CVV.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiry_date: String,
    pub cvv: String,
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("card_number", &"[REDACTED]")
            .field("cardholder_name", &self.cardholder_name)
            .field("expiry_date", &self.expiry_date)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /payments/process`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub card_details: CardDetails,
}

impl PaymentRequest {
    /// Build a payment request for `amount` from a validated form.
    #[must_use]
    pub fn new(amount: Decimal, payment: &ValidatedPayment) -> Self {
        Self {
            amount,
            payment_method: payment.payment_method,
            card_details: CardDetails {
                card_number: payment.card_number.clone(),
                cardholder_name: payment.cardholder_name.clone(),
                expiry_date: payment.expiry_date.clone(),
                cvv: payment.cvv.clone(),
            },
        }
    }
}

/// Response of `POST /payments/process`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

/// A line of an order request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub transaction_id: String,
}

/// Response of `POST /orders`.
#[derive(Debug, Default, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_order")]
    pub order: Option<Order>,
}

/// Response of `GET /orders`.
///
/// Orders are decoded one by one; a record that cannot be read is logged
/// and skipped so the rest of the history still renders.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersResponse {
    #[serde(default, deserialize_with = "lenient_orders")]
    pub orders: Vec<Order>,
}

fn decode_order(value: Value) -> Option<Order> {
    match serde_json::from_value(value) {
        Ok(order) => Some(order),
        Err(e) => {
            warn!(error = %e, "Skipping unreadable order record");
            None
        }
    }
}

fn lenient_orders<'de, D>(deserializer: D) -> Result<Vec<Order>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().filter_map(decode_order).collect())
}

fn lenient_order<'de, D>(deserializer: D) -> Result<Option<Order>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(decode_order))
}
