//! Session-backed cart.
//!
//! The cart stored in the session is just product ids and quantities; prices
//! are resolved against the live catalog on every view so that price changes
//! and deactivated products are always reflected.

use serde::{Deserialize, Serialize};

use mobigear_core::ProductId;

/// One cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// The session cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add a product to the cart.
    ///
    /// With `override_quantity` the given quantity replaces the existing
    /// line; otherwise it is added to it.
    pub fn add(&mut self, product_id: ProductId, quantity: u32, override_quantity: bool) {
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                if override_quantity {
                    line.quantity = quantity;
                } else {
                    line.quantity += quantity;
                }
            }
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
        self.lines.retain(|l| l.quantity > 0);
    }

    /// Remove a product's line entirely.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Quantity currently in the cart for a product.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    /// Total number of items (sum of line quantities).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// True when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_accumulates() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2, false);
        cart.add(ProductId::new(1), 3, false);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_add_override_replaces() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2, false);
        cart.add(ProductId::new(1), 7, true);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 7);
    }

    #[test]
    fn test_override_to_zero_drops_line() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2, false);
        cart.add(ProductId::new(1), 0, true);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 1, false);
        cart.add(ProductId::new(2), 4, false);
        cart.remove(ProductId::new(1));
        assert_eq!(cart.item_count(), 4);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_counts_multiple_lines() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(1), 2, false);
        cart.add(ProductId::new(2), 3, false);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.lines.len(), 2);
    }
}
