//! Checkout wizard state kept in the session.

use chrono::{DateTime, TimeDelta, Utc};
use fsad_core::{Order, ShippingForm};
use serde::{Deserialize, Serialize};

/// Steps of the checkout wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum CheckoutStep {
    #[default]
    CartReview,
    Shipping,
    Payment,
}

impl CheckoutStep {
    /// Every step, in wizard order.
    pub const ALL: [Self; 3] = [Self::CartReview, Self::Shipping, Self::Payment];

    /// One-based position shown in the step indicator.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::CartReview => 1,
            Self::Shipping => 2,
            Self::Payment => 3,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CartReview => "Cart Review",
            Self::Shipping => "Shipping",
            Self::Payment => "Payment",
        }
    }
}

/// Wizard progress for the current visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutState {
    pub step: CheckoutStep,
    /// Validated shipping details, set once step 2 succeeds.
    #[serde(default)]
    pub shipping: Option<ShippingForm>,
    /// Message shown in the error banner.
    #[serde(default)]
    pub error: Option<String>,
    /// When the payment currently in flight was submitted.
    #[serde(default)]
    pub processing_since: Option<DateTime<Utc>>,
}

/// A payment claim older than this is treated as abandoned.
const PROCESSING_TIMEOUT_SECS: i64 = 60;

impl CheckoutState {
    /// Move to `step`, dismissing any banner.
    pub fn go_to(&mut self, step: CheckoutStep) {
        self.step = step;
        self.error = None;
    }

    /// Store validated shipping details and advance to payment.
    pub fn complete_shipping(&mut self, shipping: ShippingForm) {
        self.shipping = Some(shipping);
        self.go_to(CheckoutStep::Payment);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Whether a payment submitted at or before `now` is still in flight.
    #[must_use]
    pub fn is_processing(&self, now: DateTime<Utc>) -> bool {
        self.processing_since
            .is_some_and(|since| now - since < TimeDelta::seconds(PROCESSING_TIMEOUT_SECS))
    }

    /// Claim the payment step for one submission.
    ///
    /// Returns `false` when another submission is already in flight.
    pub fn start_processing(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_processing(now) {
            return false;
        }
        self.processing_since = Some(now);
        self.error = None;
        true
    }

    pub fn stop_processing(&mut self) {
        self.processing_since = None;
    }
}

/// The order just placed, shown once on the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub order: Option<Order>,
    pub transaction_id: String,
}
