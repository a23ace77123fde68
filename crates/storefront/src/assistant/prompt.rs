//! Catalog-derived system prompt for the shopping assistant.

use crate::models::product::{Category, Product};

/// Build the assistant's system prompt from the live catalog.
///
/// The prompt carries the active category names and a sample of products
/// with their effective prices, so recommendations stay grounded in what
/// the store actually sells.
#[must_use]
pub fn build_system_prompt(categories: &[Category], products: &[Product]) -> String {
    let category_names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();

    let product_lines: Vec<String> = products
        .iter()
        .map(|p| {
            format!(
                "- {}: {} - {}",
                p.name,
                p.final_price().display(),
                p.category_name
            )
        })
        .collect();

    format!(
        "Bạn là trợ lý tư vấn phụ kiện điện thoại cho cửa hàng MobiGear.\n\
         Nhiệm vụ: Tư vấn sản phẩm phù hợp với nhu cầu khách hàng.\n\
         \n\
         Danh mục sản phẩm: {}\n\
         \n\
         Một số sản phẩm đang bán:\n\
         {}\n\
         \n\
         Hãy trả lời ngắn gọn, thân thiện bằng tiếng Việt. Đề xuất sản phẩm cụ thể khi có thể.",
        category_names.join(", "),
        product_lines.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mobigear_core::{CategoryId, Price, ProductId};

    fn category(name: &str) -> Category {
        Category {
            id: CategoryId::new(1),
            name: name.to_owned(),
            slug: name.to_lowercase(),
            description: String::new(),
            image_url: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn product(name: &str, price: i64, sale: Option<i64>, category_name: &str) -> Product {
        Product {
            id: ProductId::new(1),
            name: name.to_owned(),
            slug: "p".to_owned(),
            category_id: CategoryId::new(1),
            category_name: category_name.to_owned(),
            category_slug: category_name.to_lowercase(),
            description: String::new(),
            price: Price::from_vnd(price),
            sale_price: sale.map(Price::from_vnd),
            image_url: String::new(),
            video_url: None,
            stock: 1,
            is_active: true,
            is_featured: false,
            views_count: 0,
            sold_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_lists_categories_and_products() {
        let categories = vec![category("Tai nghe"), category("Ốp lưng")];
        let products = vec![product(
            "Tai nghe Bluetooth TWS Pro",
            450_000,
            Some(299_000),
            "Tai nghe",
        )];

        let prompt = build_system_prompt(&categories, &products);
        assert!(prompt.contains("Tai nghe, Ốp lưng"));
        // The sale price, not the list price, is quoted to the model
        assert!(prompt.contains("- Tai nghe Bluetooth TWS Pro: 299.000đ - Tai nghe"));
        assert!(!prompt.contains("450.000đ"));
    }
}
