//! Shopping cart held in the visitor's session.
//!
//! Quantities are bounded by the stock reported when the product was added.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ProductId;
use super::price::Price;

/// Errors from cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product has no stock left.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// Requested quantity was zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub stock: u32,
    pub image: Option<String>,
}

impl CartItem {
    /// Price of the line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Whether the quantity has reached the available stock.
    #[must_use]
    pub const fn at_max_stock(&self) -> bool {
        self.quantity >= self.stock
    }
}

/// Outcome of a quantity change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has the requested quantity.
    Updated,
    /// The requested quantity was below one, so the line was removed.
    Removed,
    /// The request exceeded stock (or the product is not in the cart);
    /// nothing changed.
    Ignored,
}

/// Cart totals shown in the order summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub item_count: u32,
    pub subtotal: Price,
    pub total: Price,
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line is increased; either way the quantity is capped at
    /// the item's stock. The stock, price, name and image of an existing
    /// line are refreshed from `item`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ZeroQuantity` for a zero quantity and
    /// `CartError::OutOfStock` when the product has no stock.
    pub fn add(&mut self, item: CartItem, quantity: u32) -> Result<u32, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }
        if item.stock == 0 {
            return Err(CartError::OutOfStock { name: item.name });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.name = item.name;
            existing.price = item.price;
            existing.stock = item.stock;
            existing.image = item.image;
            existing.quantity = existing.quantity.saturating_add(quantity).min(existing.stock);
            return Ok(existing.quantity);
        }

        let quantity = quantity.min(item.stock);
        self.items.push(CartItem { quantity, ..item });
        Ok(quantity)
    }

    /// Set a line's quantity from the cart review controls.
    ///
    /// Below one removes the line; above stock leaves it unchanged.
    pub fn change_quantity(&mut self, product_id: &ProductId, quantity: i64) -> QuantityChange {
        if quantity < 1 {
            return if self.remove(product_id) {
                QuantityChange::Removed
            } else {
                QuantityChange::Ignored
            };
        }

        let Some(item) = self.items.iter_mut().find(|i| &i.product_id == product_id) else {
            return QuantityChange::Ignored;
        };
        match u32::try_from(quantity) {
            Ok(quantity) if quantity <= item.stock => {
                item.quantity = quantity;
                QuantityChange::Updated
            }
            _ => QuantityChange::Ignored,
        }
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Totals for the order summary.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let subtotal: Price = self.items.iter().map(CartItem::line_total).sum();
        let item_count = self
            .items
            .iter()
            .fold(0u32, |acc, i| acc.saturating_add(i.quantity));

        CartTotals {
            item_count,
            subtotal,
            total: subtotal,
        }
    }
}
