//! Core types for the storefront.
//!
//! This module provides type-safe wrappers and form models for the
//! checkout and order-history flows.

pub mod address;
pub mod cart;
pub mod form;
pub mod id;
pub mod order;
pub mod payment;
pub mod price;
pub mod status;

pub use address::{ShippingAddress, ShippingField, ShippingForm};
pub use cart::{Cart, CartError, CartItem, CartTotals, QuantityChange};
pub use form::FormErrors;
pub use id::*;
pub use order::{
    Order, OrderAddress, OrderItem, OrderProduct, PLACEHOLDER_IMAGE, StatusFilter, TimelineStep,
    sort_newest_first,
};
pub use payment::{PaymentField, PaymentForm, ValidatedPayment};
pub use price::{CurrencyCode, Price};
pub use status::*;
