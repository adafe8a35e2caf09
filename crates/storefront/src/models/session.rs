//! Session-related types.
//!
//! Types stored in the session for the signed-in customer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Session-stored customer identity.
///
/// Set by the auth hand-off. The access token authorises payment and order
/// calls to the backend; `Debug` redacts it.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Display name shown in the header.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Bearer token issued by the auth service.
    pub access_token: String,
}

impl CurrentUser {
    /// Name for the header greeting, `User` when the profile has none.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { "User" } else { name }
    }
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the signed-in customer.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the cart.
    pub const CART: &str = "cart";

    /// Key for the checkout wizard state.
    pub const CHECKOUT: &str = "checkout";

    /// Key for the last placed order, shown once on the confirmation page.
    pub const CONFIRMATION: &str = "confirmation";
}
