//! Catalog repository: categories, products, and gallery images.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use mobigear_core::{CategoryId, Price, ProductId, ProductImageId};

use super::RepositoryError;
use crate::models::product::{Category, Product, ProductImage};

/// Products per page on listing pages.
pub const PAGE_SIZE: i64 = 12;

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            image_url: row.image_url,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    category_id: i32,
    category_name: String,
    category_slug: String,
    description: String,
    price: Price,
    sale_price: Option<Price>,
    image_url: String,
    video_url: Option<String>,
    stock: i32,
    is_active: bool,
    is_featured: bool,
    views_count: i32,
    sold_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            category_id: CategoryId::new(row.category_id),
            category_name: row.category_name,
            category_slug: row.category_slug,
            description: row.description,
            price: row.price,
            sale_price: row.sale_price,
            image_url: row.image_url,
            video_url: row.video_url,
            stock: row.stock,
            is_active: row.is_active,
            is_featured: row.is_featured,
            views_count: row.views_count,
            sold_count: row.sold_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.slug, p.category_id, c.name AS category_name,
           c.slug AS category_slug,
           p.description, p.price, p.sale_price, p.image_url, p.video_url,
           p.stock, p.is_active, p.is_featured, p.views_count, p.sold_count,
           p.created_at, p.updated_at
    FROM products p
    JOIN categories c ON c.id = p.category_id
";

/// Sort orders for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Newest first (the default).
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
    BestSeller,
}

impl ProductSort {
    /// Parse the `sort` query parameter; unknown values fall back to newest.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("name") => Self::Name,
            Some("best_seller") => Self::BestSeller,
            _ => Self::Newest,
        }
    }

    const fn order_clause(self) -> &'static str {
        match self {
            Self::Newest => "p.created_at DESC",
            Self::PriceAsc => "p.price ASC",
            Self::PriceDesc => "p.price DESC",
            Self::Name => "p.name ASC",
            Self::BestSeller => "p.sold_count DESC",
        }
    }
}

/// Filters for the product listing page.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Keyword matched against product name, description, and category name.
    pub q: Option<String>,
    pub category_id: Option<CategoryId>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort: ProductSort,
}

/// A page of products plus the total match count.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self, limit: Option<i64>) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug, description, image_url, is_active, created_at
            FROM categories
            WHERE is_active
            ORDER BY name
            LIMIT $1
            ",
        )
        .bind(limit.unwrap_or(i64::MAX))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an active category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, slug, description, image_url, is_active, created_at
            FROM categories
            WHERE slug = $1 AND is_active
            ",
        )
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Up to `limit` featured active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.is_active AND p.is_featured ORDER BY p.created_at DESC LIMIT $1");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Up to `limit` newest active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn newest(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.is_active ORDER BY p.created_at DESC LIMIT $1");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Up to `limit` active products by units sold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn best_sellers(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.is_active ORDER BY p.sold_count DESC LIMIT $1");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Filtered, sorted, paginated listing of active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn search(
        &self,
        filter: &ProductFilter,
        page: i64,
    ) -> Result<ProductPage, RepositoryError> {
        let page = page.max(1);

        let mut count_builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM products p JOIN categories c ON c.id = p.category_id",
        );
        Self::push_filters(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(PRODUCT_SELECT);
        Self::push_filters(&mut builder, filter);
        builder.push(" ORDER BY ");
        builder.push(filter.sort.order_clause());
        builder.push(" LIMIT ");
        builder.push_bind(PAGE_SIZE);
        builder.push(" OFFSET ");
        builder.push_bind((page - 1) * PAGE_SIZE);

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;

        let total_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
        Ok(ProductPage {
            products: rows.into_iter().map(Into::into).collect(),
            total,
            page,
            total_pages,
        })
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
        builder.push(" WHERE p.is_active");

        if let Some(q) = filter.q.as_deref().filter(|q| !q.is_empty()) {
            let pattern = format!("%{q}%");
            builder.push(" AND (p.name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR p.description ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR c.name ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if let Some(category_id) = filter.category_id {
            builder.push(" AND p.category_id = ");
            builder.push_bind(category_id.as_i32());
        }
        if let Some(min) = filter.min_price {
            builder.push(" AND p.price >= ");
            builder.push_bind(min);
        }
        if let Some(max) = filter.max_price {
            builder.push(" AND p.price <= ");
            builder.push_bind(max);
        }
    }

    /// Get an active product by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.slug = $1 AND p.is_active");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(slug)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Get an active product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_id(
        &self,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = $1 AND p.is_active");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Fetch the active products for a set of ids (cart resolution).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_active_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let sql = format!("{PRODUCT_SELECT} WHERE p.id = ANY($1) AND p.is_active");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(&raw)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Bump the view counter for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn increment_views(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE products SET views_count = views_count + 1 WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Gallery images for a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn images(&self, product_id: ProductId) -> Result<Vec<ProductImage>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct ImageRow {
            id: i32,
            product_id: i32,
            image_url: String,
            is_primary: bool,
        }

        let rows = sqlx::query_as::<_, ImageRow>(
            r"
            SELECT id, product_id, image_url, is_primary
            FROM product_images
            WHERE product_id = $1
            ORDER BY is_primary DESC, id
            ",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ProductImage {
                id: ProductImageId::new(r.id),
                product_id: ProductId::new(r.product_id),
                image_url: r.image_url,
                is_primary: r.is_primary,
            })
            .collect())
    }

    /// Up to `limit` other active products from the same category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(
        &self,
        category_id: CategoryId,
        exclude: ProductId,
        limit: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "{PRODUCT_SELECT} WHERE p.category_id = $1 AND p.is_active AND p.id <> $2
             ORDER BY p.created_at DESC LIMIT $3"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category_id.as_i32())
            .bind(exclude.as_i32())
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Lightweight autocomplete search over active products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn autocomplete(&self, q: &str, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{q}%");
        let sql = format!(
            "{PRODUCT_SELECT} WHERE p.is_active AND (p.name ILIKE $1 OR p.description ILIKE $1)
             ORDER BY p.sold_count DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(pattern)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
