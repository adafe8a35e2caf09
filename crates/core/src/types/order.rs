//! Orders as returned by the order service, plus history-page helpers.
//!
//! The order service is loosely typed: most fields may be missing or
//! `null`, amounts arrive as numbers or strings, ids may be numbers or
//! document-id strings named `id` or `_id`, and an item's `product` may be
//! an embedded document or a bare id. The types here accept all of that and
//! expose display-ready accessors with the storefront's fallbacks.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{OrderId, OrderItemId, ProductId};
use super::price::format_amount;
use super::status::OrderStatus;

/// Image shown when an order item has none.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

/// An order placed by the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, alias = "_id")]
    pub id: Option<OrderId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<OrderAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    /// Status exactly as the order service sent it.
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A line of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, alias = "_id")]
    pub id: Option<OrderItemId>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default, deserialize_with = "product_ref")]
    pub product: Option<OrderProduct>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
}

/// Product details embedded in an order line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderProduct {
    #[serde(default, alias = "_id")]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Shipping address recorded on an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    #[serde(default, deserialize_with = "null_as_default")]
    pub street: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub zip_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
}

/// One step of the order timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineStep {
    pub label: &'static str,
    pub active: bool,
}

impl Order {
    /// Status, treating a missing or blank status as `Pending`.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        non_empty(self.order_status.as_deref())
            .map_or_else(OrderStatus::default, OrderStatus::from)
    }

    /// Badge label: the known status label, or the service's own string for
    /// statuses the storefront does not know.
    #[must_use]
    pub fn status_label(&self) -> &str {
        match self.status() {
            OrderStatus::Unknown => self.order_status.as_deref().map_or("Unknown", str::trim),
            status => status.label(),
        }
    }

    /// Customer-facing order number, e.g. `#ORD-000042`.
    #[must_use]
    pub fn number(&self) -> String {
        let id = self.id.as_ref().map_or_else(|| "0".to_string(), ToString::to_string);
        format!("#ORD-{id:0>6}")
    }

    /// Total with two decimals, `0.00` when missing.
    #[must_use]
    pub fn total_string(&self) -> String {
        format_amount(self.total_amount.unwrap_or_default())
    }

    /// Creation time, if present and parsable.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    /// Creation date as `Mon D, YYYY`, or `Unknown date`.
    #[must_use]
    pub fn created_date_string(&self) -> String {
        self.created_at().map_or_else(
            || "Unknown date".to_string(),
            |ts| ts.format("%b %-d, %Y").to_string(),
        )
    }

    /// Delivery timeline for the order's status.
    ///
    /// Cancelled orders show a single active `Cancelled` step. Otherwise
    /// every step up to the current one is active; statuses that are not on
    /// the timeline count as the first step.
    #[must_use]
    pub fn timeline(&self) -> Vec<TimelineStep> {
        let status = self.status();
        if status == OrderStatus::Cancelled {
            return vec![TimelineStep {
                label: OrderStatus::Cancelled.label(),
                active: true,
            }];
        }

        let current = status.timeline_index().unwrap_or(0);
        OrderStatus::TIMELINE
            .iter()
            .enumerate()
            .map(|(index, step)| TimelineStep {
                label: step.label(),
                active: index <= current,
            })
            .collect()
    }

    #[must_use]
    pub fn payment_method_or_default(&self) -> &str {
        non_empty(self.payment_method.as_deref()).unwrap_or("N/A")
    }

    #[must_use]
    pub fn transaction_id_or_default(&self) -> &str {
        non_empty(self.transaction_id.as_deref()).unwrap_or("N/A")
    }

    #[must_use]
    pub fn payment_status_or_default(&self) -> &str {
        non_empty(self.payment_status.as_deref()).unwrap_or("Pending")
    }
}

impl OrderItem {
    /// Product id from the embedded product, falling back to `product_id`.
    #[must_use]
    pub fn linked_product_id(&self) -> Option<ProductId> {
        self.product
            .as_ref()
            .and_then(|p| p.id.clone())
            .or_else(|| self.product_id.clone())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        non_empty(self.product.as_ref().and_then(|p| p.name.as_deref())).unwrap_or("Product")
    }

    #[must_use]
    pub fn image(&self) -> &str {
        non_empty(self.product.as_ref().and_then(|p| p.image.as_deref()))
            .unwrap_or(PLACEHOLDER_IMAGE)
    }

    /// Price with two decimals, `0.00` when missing.
    #[must_use]
    pub fn price_string(&self) -> String {
        format_amount(self.price.unwrap_or_default())
    }
}

/// Sort orders newest first. Orders without a parsable date go last.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| match (a.created_at(), b.created_at()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Status filter on the order history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Every filter option, in display order.
    #[must_use]
    pub fn options() -> Vec<Self> {
        std::iter::once(Self::All)
            .chain(OrderStatus::FILTERABLE.into_iter().map(Self::Only))
            .collect()
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }

    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => order.order_status.as_deref() == Some(status.label()),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "All" {
            return Ok(Self::All);
        }
        OrderStatus::FILTERABLE
            .into_iter()
            .find(|status| status.label() == s)
            .map(Self::Only)
            .ok_or_else(|| format!("invalid status filter: {s}"))
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept an embedded product document or a bare product id.
fn product_ref<'de, D>(deserializer: D) -> Result<Option<OrderProduct>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ProductRef {
        Document(OrderProduct),
        Id(ProductId),
    }

    Ok(match Option::<ProductRef>::deserialize(deserializer)? {
        Some(ProductRef::Document(product)) => Some(product),
        Some(ProductRef::Id(id)) => Some(OrderProduct {
            id: Some(id),
            ..OrderProduct::default()
        }),
        None => None,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse the timestamp formats the order service emits.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(ts.and_utc());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}

/// Deserialize an amount given as a number or numeric string.
///
/// Anything unparsable becomes `None` instead of failing the order.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Value(Decimal),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Value(value)) => Some(value),
        Some(Lenient::Other(_)) | None => None,
    })
}
