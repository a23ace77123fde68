//! Catalog models: categories, products, images, and reviews.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use mobigear_core::{CategoryId, Price, ProductId, ProductImageId, ReviewId, UserId};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Path of the category listing page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/category/{}", self.slug)
    }
}

/// A product in the catalog.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub category_slug: String,
    pub description: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub image_url: String,
    pub video_url: Option<String>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub views_count: i32,
    pub sold_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The effective selling price: the sale price when set, else the list price.
    #[must_use]
    pub fn final_price(&self) -> Price {
        self.sale_price.unwrap_or(self.price)
    }

    /// Discount percentage derived from the sale price, truncated to an integer.
    ///
    /// Zero when there is no sale price or the list price is not positive.
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        match self.sale_price {
            Some(sale) if self.price.amount() > Decimal::ZERO => {
                let ratio = sale.amount() / self.price.amount();
                let percent = (Decimal::ONE - ratio) * Decimal::from(100);
                percent.trunc().to_u32().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Path of the product detail page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("/products/{}", self.slug)
    }

    /// Converts a YouTube watch URL into an embeddable URL.
    ///
    /// Supports the `youtube.com/watch?v=` and `youtu.be/` forms; anything
    /// else (or no video) yields `None`.
    #[must_use]
    pub fn youtube_embed_url(&self) -> Option<String> {
        let url = self.video_url.as_deref()?;

        if let Some(rest) = url.split("youtube.com/watch?v=").nth(1) {
            let video_id = rest.split('&').next().unwrap_or(rest);
            return Some(format!("https://www.youtube.com/embed/{video_id}"));
        }
        if let Some(video_id) = url.split("youtu.be/").nth(1) {
            return Some(format!("https://www.youtube.com/embed/{video_id}"));
        }
        None
    }
}

/// An additional gallery image for a product.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub product_id: ProductId,
    pub image_url: String,
    pub is_primary: bool,
}

/// A product review. One per (product, user) pair.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub username: String,
    pub rating: i16,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mean of approved review ratings, rounded to one decimal place.
///
/// Returns 0.0 when there are no ratings.
#[must_use]
pub fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product(price: i64, sale_price: Option<i64>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Ốp lưng iPhone 15 Pro Max trong suốt".to_owned(),
            slug: "product-1".to_owned(),
            category_id: CategoryId::new(1),
            category_name: "Ốp lưng".to_owned(),
            category_slug: "op-lung".to_owned(),
            description: String::new(),
            price: Price::from_vnd(price),
            sale_price: sale_price.map(Price::from_vnd),
            image_url: String::new(),
            video_url: None,
            stock: 10,
            is_active: true,
            is_featured: false,
            views_count: 0,
            sold_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_final_price_prefers_sale_price() {
        let product = sample_product(150_000, Some(99_000));
        assert_eq!(product.final_price(), Price::from_vnd(99_000));
        let product = sample_product(150_000, None);
        assert_eq!(product.final_price(), Price::from_vnd(150_000));
    }

    #[test]
    fn test_discount_percent() {
        // 1 - 99000/150000 = 0.34 -> 34
        assert_eq!(sample_product(150_000, Some(99_000)).discount_percent(), 34);
        assert_eq!(sample_product(150_000, None).discount_percent(), 0);
        assert_eq!(sample_product(0, Some(1_000)).discount_percent(), 0);
        // Truncation, not rounding: 1 - 2/3 = 0.333... -> 33
        assert_eq!(sample_product(300_000, Some(200_000)).discount_percent(), 33);
    }

    #[test]
    fn test_youtube_embed_url() {
        let mut product = sample_product(100, None);
        assert_eq!(product.youtube_embed_url(), None);

        product.video_url = Some("https://www.youtube.com/watch?v=abc123&t=10".to_owned());
        assert_eq!(
            product.youtube_embed_url().as_deref(),
            Some("https://www.youtube.com/embed/abc123")
        );

        product.video_url = Some("https://youtu.be/xyz789".to_owned());
        assert_eq!(
            product.youtube_embed_url().as_deref(),
            Some("https://www.youtube.com/embed/xyz789")
        );

        product.video_url = Some("https://vimeo.com/123".to_owned());
        assert_eq!(product.youtube_embed_url(), None);
    }

    #[test]
    fn test_average_rating() {
        assert!((average_rating(&[]) - 0.0).abs() < f64::EPSILON);
        assert!((average_rating(&[5, 4, 4]) - 4.3).abs() < f64::EPSILON);
        assert!((average_rating(&[1, 2]) - 1.5).abs() < f64::EPSILON);
    }
}
