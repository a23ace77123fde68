//! Integration tests for the session cart's quantity semantics.

use mobigear_core::ProductId;
use mobigear_storefront::models::Cart;

#[test]
fn test_add_then_add_accumulates() {
    let mut cart = Cart::default();
    cart.add(ProductId::new(10), 1, false);
    cart.add(ProductId::new(10), 2, false);
    assert_eq!(cart.quantity_of(ProductId::new(10)), 3);
}

#[test]
fn test_override_replaces_quantity() {
    let mut cart = Cart::default();
    cart.add(ProductId::new(10), 5, false);
    // The cart page quantity field posts with override=true
    cart.add(ProductId::new(10), 2, true);
    assert_eq!(cart.quantity_of(ProductId::new(10)), 2);
}

#[test]
fn test_item_count_sums_quantities() {
    let mut cart = Cart::default();
    cart.add(ProductId::new(1), 2, false);
    cart.add(ProductId::new(2), 1, false);
    cart.add(ProductId::new(3), 4, false);
    assert_eq!(cart.item_count(), 7);
    assert_eq!(cart.lines.len(), 3);
}

#[test]
fn test_remove_only_touches_one_line() {
    let mut cart = Cart::default();
    cart.add(ProductId::new(1), 2, false);
    cart.add(ProductId::new(2), 3, false);
    cart.remove(ProductId::new(1));
    assert_eq!(cart.quantity_of(ProductId::new(1)), 0);
    assert_eq!(cart.quantity_of(ProductId::new(2)), 3);
}

#[test]
fn test_cart_serializes_for_the_session() {
    let mut cart = Cart::default();
    cart.add(ProductId::new(7), 2, false);

    let json = serde_json::to_string(&cart).expect("serialize");
    let back: Cart = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.quantity_of(ProductId::new(7)), 2);
}
