//! Session-held state for storefront visitors.

pub mod checkout;
pub mod session;

pub use checkout::{CheckoutState, CheckoutStep, Confirmation};
pub use session::{CurrentUser, keys as session_keys};
