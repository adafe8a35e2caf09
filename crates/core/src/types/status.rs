//! Status and method enums shared by checkout and order history.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Order lifecycle status as the storefront understands it.
///
/// Parsed from the order service's free-form status string; values the
/// storefront does not know map to `Unknown`, and the order keeps the raw
/// string for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Unknown,
}

impl OrderStatus {
    /// Statuses a customer can filter by, in display order.
    pub const FILTERABLE: [Self; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Steps of the delivery timeline, in order.
    pub const TIMELINE: [Self; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
    ];

    /// Display label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    /// Badge colour for the status.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Pending => "#f5b50a",
            Self::Processing => "#3b82f6",
            Self::Shipped => "#7c3aed",
            Self::Delivered => "#16a34a",
            Self::Cancelled => "#dc2626",
            Self::Unknown => "#94a3b8",
        }
    }

    /// Position in the delivery timeline, if the status is on it.
    #[must_use]
    pub fn timeline_index(&self) -> Option<usize> {
        Self::TIMELINE.iter().position(|s| s == self)
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        match value.trim() {
            "" | "Pending" => Self::Pending,
            "Processing" => Self::Processing,
            "Shipped" => Self::Shipped,
            "Delivered" => Self::Delivered,
            "Cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the customer pays.
///
/// Wire and form values are the display labels (`"Credit Card"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Net Banking")]
    NetBanking,
}

impl PaymentMethod {
    /// All methods, in the order the payment form lists them.
    pub const ALL: [Self; 4] = [Self::CreditCard, Self::DebitCard, Self::Upi, Self::NetBanking];

    /// Display label, identical to the wire value.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::DebitCard => "Debit Card",
            Self::Upi => "UPI",
            Self::NetBanking => "Net Banking",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == s)
            .ok_or_else(|| format!("invalid payment method: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_parses_leniently() {
        let statuses: Vec<OrderStatus> = ["Shipped", "", "Returned", " Cancelled "]
            .into_iter()
            .map(OrderStatus::from)
            .collect();
        assert_eq!(
            statuses,
            vec![
                OrderStatus::Shipped,
                OrderStatus::Pending,
                OrderStatus::Unknown,
                OrderStatus::Cancelled
            ]
        );
    }

    #[test]
    fn test_order_status_colors() {
        assert_eq!(OrderStatus::Pending.color(), "#f5b50a");
        assert_eq!(OrderStatus::Delivered.color(), "#16a34a");
        assert_eq!(OrderStatus::Unknown.color(), "#94a3b8");
    }

    #[test]
    fn test_timeline_index() {
        assert_eq!(OrderStatus::Pending.timeline_index(), Some(0));
        assert_eq!(OrderStatus::Delivered.timeline_index(), Some(3));
        assert_eq!(OrderStatus::Cancelled.timeline_index(), None);
    }

    #[test]
    fn test_payment_method_wire_format() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::NetBanking).unwrap(),
            r#""Net Banking""#
        );
        let method: PaymentMethod = serde_json::from_str(r#""UPI""#).unwrap();
        assert_eq!(method, PaymentMethod::Upi);
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!(
            "Debit Card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::DebitCard
        );
        assert!("Cash".parse::<PaymentMethod>().is_err());
    }
}
