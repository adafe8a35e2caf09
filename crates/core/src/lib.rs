//! FSAD Core - Shared domain types for the storefront.
//!
//! This crate provides the types and pure logic used by the storefront:
//! - `storefront` - Server-rendered checkout, order history and catalog
//! - `integration-tests` - End-to-end tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no sessions. Everything here is deterministic: functions that
//! depend on the current date take it as an argument.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, statuses, cart, shipping and payment forms, orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
