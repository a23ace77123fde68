//! Integration tests for the assistant's catalog-derived system prompt.

use chrono::Utc;

use mobigear_core::{CategoryId, Price, ProductId};
use mobigear_storefront::assistant::build_system_prompt;
use mobigear_storefront::models::product::{Category, Product};

fn category(id: i32, name: &str, slug: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_owned(),
        slug: slug.to_owned(),
        description: String::new(),
        image_url: None,
        is_active: true,
        created_at: Utc::now(),
    }
}

fn product(name: &str, price: i64, sale: Option<i64>, category: &str) -> Product {
    Product {
        id: ProductId::new(1),
        name: name.to_owned(),
        slug: "p".to_owned(),
        category_id: CategoryId::new(1),
        category_name: category.to_owned(),
        category_slug: "c".to_owned(),
        description: String::new(),
        price: Price::from_vnd(price),
        sale_price: sale.map(Price::from_vnd),
        image_url: String::new(),
        video_url: None,
        stock: 5,
        is_active: true,
        is_featured: false,
        views_count: 0,
        sold_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_prompt_contains_categories_and_priced_products() {
    let categories = vec![
        category(1, "Ốp lưng", "op-lung"),
        category(2, "Tai nghe", "tai-nghe"),
        category(3, "Pin dự phòng", "pin-du-phong"),
    ];
    let products = vec![
        product("Pin sạc dự phòng 20000mAh", 450_000, Some(350_000), "Pin dự phòng"),
        product("Cáp Type-C to Lightning 2m", 150_000, None, "Sạc & Cáp"),
    ];

    let prompt = build_system_prompt(&categories, &products);

    assert!(prompt.contains("Ốp lưng, Tai nghe, Pin dự phòng"));
    assert!(prompt.contains("- Pin sạc dự phòng 20000mAh: 350.000đ - Pin dự phòng"));
    assert!(prompt.contains("- Cáp Type-C to Lightning 2m: 150.000đ - Sạc & Cáp"));
    // The store name anchors the assistant's persona
    assert!(prompt.contains("MobiGear"));
}

#[test]
fn test_prompt_with_empty_catalog() {
    let prompt = build_system_prompt(&[], &[]);
    // Still a coherent prompt, just without inventory
    assert!(prompt.contains("Danh mục sản phẩm"));
}
