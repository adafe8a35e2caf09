//! Site header with the account menu.

use crate::models::CurrentUser;

/// Storefront title shown in the header.
pub const SITE_TITLE: &str = "Linux FSAD ecommerce";

/// Paths that render without the header.
const HEADERLESS_PATHS: [&str; 2] = ["/login", "/register"];

/// Header display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub title: &'static str,
    /// "Welcome, {name}" trigger text.
    pub greeting: String,
    /// Whether the Orders nav link gets the `active` class.
    pub orders_active: bool,
}

impl HeaderView {
    /// Header for `path`, or `None` when it should not render.
    #[must_use]
    pub fn for_request(user: Option<&CurrentUser>, path: &str) -> Option<Self> {
        let user = user?;
        if HEADERLESS_PATHS.contains(&path) {
            return None;
        }

        Some(Self {
            title: SITE_TITLE,
            greeting: format!("Welcome, {}", user.display_name()),
            orders_active: path == "/orders",
        })
    }
}
