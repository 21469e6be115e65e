//! Session-backed shopping cart.
//!
//! The cart is stored in the tower-sessions session as a serialized value
//! and mutated through the cart routes. It is the storefront's source of
//! truth for line items until an order is placed, at which point it is
//! cleared.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single cart line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    /// Line ID, generated when the item is added.
    pub id: Uuid,
    /// Merchant SKU of the product.
    pub sku: String,
    /// Display name of the product.
    pub name: String,
    /// Quantity of this line (always >= 1).
    pub quantity: u32,
    /// Price for a single unit.
    pub unit_price: Decimal,
}

impl CartItem {
    /// Total price for this line (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The shopping cart: an ordered sequence of line items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines. Saturates at `u32::MAX`,
    /// since quantities come straight from user input.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add an item to the cart. Lines with the same SKU are merged.
    pub fn add(&mut self, sku: String, name: String, unit_price: Decimal, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(existing) = self.items.iter_mut().find(|item| item.sku == sku) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return;
        }
        self.items.push(CartItem {
            id: Uuid::new_v4(),
            sku,
            name,
            quantity,
            unit_price,
        });
    }

    /// Set the quantity for a line. A quantity of zero removes the line.
    pub fn update_quantity(&mut self, line_id: Uuid, quantity: u32) {
        if quantity == 0 {
            self.remove(line_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.id == line_id) {
            item.quantity = quantity;
        }
    }

    /// Remove a line from the cart.
    pub fn remove(&mut self, line_id: Uuid) {
        self.items.retain(|item| item.id != line_id);
    }

    /// Remove all lines. Called after a successful order.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
