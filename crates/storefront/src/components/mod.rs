//! View models shared by several pages.
//!
//! Each component turns domain state into the plain strings and flags its
//! askama partial renders.

pub mod header;
pub mod payment_form;
pub mod shipping_form;

pub use header::HeaderView;
pub use payment_form::PaymentFormView;
pub use shipping_form::ShippingFormView;
