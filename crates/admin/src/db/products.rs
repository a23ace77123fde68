//! Product management repository.
//!
//! Unlike the storefront catalog, listings here include inactive products,
//! and the full CRUD surface is available.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use mobigear_core::{CategoryId, Price, ProductId};

use super::RepositoryError;

/// A product row as the admin panel sees it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ManagedProduct {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub category_id: i32,
    pub category_name: String,
    pub description: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub image_url: String,
    pub video_url: Option<String>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub sold_count: i32,
    pub views_count: i32,
    pub created_at: DateTime<Utc>,
}

/// A category option for forms and filters.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryOption {
    pub id: i32,
    pub name: String,
}

/// Fields settable through the product form.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub category_id: CategoryId,
    pub description: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub image_url: String,
    pub video_url: Option<String>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
}

/// Listing filter for the product management page.
#[derive(Debug, Clone, Default)]
pub struct ProductManageFilter {
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
}

const MANAGED_SELECT: &str = r"
    SELECT p.id, p.name, p.slug, p.category_id, c.name AS category_name,
           p.description, p.price, p.sale_price, p.image_url, p.video_url,
           p.stock, p.is_active, p.is_featured, p.sold_count, p.views_count,
           p.created_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
";

/// Repository for product management.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products (active and inactive), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductManageFilter,
    ) -> Result<Vec<ManagedProduct>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(MANAGED_SELECT);
        builder.push(" WHERE TRUE");

        if let Some(category_id) = filter.category_id {
            builder.push(" AND p.category_id = ");
            builder.push_bind(category_id.as_i32());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            builder.push(" AND p.name ILIKE ");
            builder.push_bind(format!("%{search}%"));
        }
        builder.push(" ORDER BY p.created_at DESC");

        let rows: Vec<ManagedProduct> = builder.build_query_as().fetch_all(self.pool).await?;
        Ok(rows)
    }

    /// Get one product by ID (active or not).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<ManagedProduct>, RepositoryError> {
        let sql = format!("{MANAGED_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ManagedProduct>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// All categories for the form dropdowns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<CategoryOption>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryOption>(
            "SELECT id, name FROM categories ORDER BY name",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, input: &ProductInput) -> Result<ProductId, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO products (name, slug, category_id, description, price,
                                  sale_price, image_url, video_url, stock,
                                  is_active, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.category_id.as_i32())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.sale_price)
        .bind(&input.image_url)
        .bind(input.video_url.as_deref())
        .bind(input.stock)
        .bind(input.is_active)
        .bind(input.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        Ok(ProductId::new(id))
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist and
    /// `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $1, slug = $2, category_id = $3, description = $4,
                price = $5, sale_price = $6, image_url = $7, video_url = $8,
                stock = $9, is_active = $10, is_featured = $11, updated_at = NOW()
            WHERE id = $12
            ",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(input.category_id.as_i32())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.sale_price)
        .bind(&input.image_url)
        .bind(input.video_url.as_deref())
        .bind(input.stock)
        .bind(input.is_active)
        .bind(input.is_featured)
        .bind(id.as_i32())
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Soft-delete a product (`is_active = false`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE products SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id.as_i32())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
