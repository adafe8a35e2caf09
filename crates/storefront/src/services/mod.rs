//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Session-held cart and wizard state
//! - `checkout` - Payment then order creation for the current cart

pub mod cart;
pub mod checkout;

pub use checkout::{CheckoutError, CheckoutService, PlacedOrder};
