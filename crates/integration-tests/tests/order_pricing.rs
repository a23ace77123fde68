//! Integration tests for order pricing and derived product prices.

use chrono::Utc;

use mobigear_core::{CategoryId, Price, ProductId};
use mobigear_storefront::models::order_total;
use mobigear_storefront::models::product::Product;

fn product(price: i64, sale_price: Option<i64>) -> Product {
    Product {
        id: ProductId::new(1),
        name: "Kính cường lực iPhone 15 Pro".to_owned(),
        slug: "product-16".to_owned(),
        category_id: CategoryId::new(5),
        category_name: "Miếng dán màn hình".to_owned(),
        category_slug: "mieng-dan".to_owned(),
        description: String::new(),
        price: Price::from_vnd(price),
        sale_price: sale_price.map(Price::from_vnd),
        image_url: String::new(),
        video_url: None,
        stock: 25,
        is_active: true,
        is_featured: false,
        views_count: 0,
        sold_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_order_total_formula() {
    // total = subtotal + shipping_fee - discount
    let total = order_total(
        Price::from_vnd(250_000),
        Price::from_vnd(30_000),
        Price::from_vnd(25_000),
    );
    assert_eq!(total, Price::from_vnd(255_000));
}

#[test]
fn test_order_total_without_discount() {
    let total = order_total(Price::from_vnd(398_000), Price::from_vnd(30_000), Price::ZERO);
    assert_eq!(total, Price::from_vnd(428_000));
}

#[test]
fn test_order_total_clamps_at_zero() {
    let total = order_total(Price::from_vnd(10_000), Price::ZERO, Price::from_vnd(99_000));
    assert_eq!(total, Price::ZERO);
}

#[test]
fn test_final_price_uses_sale_price() {
    assert_eq!(
        product(100_000, Some(79_000)).final_price(),
        Price::from_vnd(79_000)
    );
    assert_eq!(product(100_000, None).final_price(), Price::from_vnd(100_000));
}

#[test]
fn test_discount_percent_truncates() {
    // 1 - 79000/100000 = 21%
    assert_eq!(product(100_000, Some(79_000)).discount_percent(), 21);
    // 1 - 99000/150000 = 34%
    assert_eq!(product(150_000, Some(99_000)).discount_percent(), 34);
    // No sale price
    assert_eq!(product(100_000, None).discount_percent(), 0);
}

#[test]
fn test_vnd_display_format() {
    assert_eq!(Price::from_vnd(255_000).display(), "255.000đ");
    assert_eq!(Price::from_vnd(1_200_000).display(), "1.200.000đ");
}
