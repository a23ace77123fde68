//! Product listing, detail, category, and review handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::{Price, ProductId};

use crate::db::RepositoryError;
use crate::db::products::{ProductFilter, ProductRepository, ProductSort};
use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::product::{Category, Product, Review, average_rating};
use crate::routes::context::PageContext;
use crate::state::AppState;

/// Product display data for cards and listings.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub slug: String,
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub category_name: String,
    pub price: String,
    /// List price shown struck through when a sale price applies.
    pub original_price: Option<String>,
    pub discount_percent: u32,
    pub in_stock: bool,
    pub sold_count: i32,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            slug: product.slug.clone(),
            name: product.name.clone(),
            url: product.url(),
            image_url: product.image_url.clone(),
            category_name: product.category_name.clone(),
            price: product.final_price().display(),
            original_price: product
                .sale_price
                .map(|_| product.price.display()),
            discount_percent: product.discount_percent(),
            in_stock: product.stock > 0,
            sold_count: product.sold_count,
        }
    }
}

/// Review display data.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub username: String,
    pub rating: i16,
    pub comment: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            username: review.username.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: review.created_at,
        }
    }
}

/// Listing filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    #[serde(default)]
    pub sort: String,
    pub page: Option<i64>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCardView>,
    pub all_categories: Vec<Category>,
    pub q: String,
    pub selected_category: String,
    pub min_price: String,
    pub max_price: String,
    pub sort: String,
    pub total: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductDetailView,
    pub reviews: Vec<ReviewView>,
    pub average_rating: f64,
    pub review_count: usize,
    pub related: Vec<ProductCardView>,
    pub user_review: Option<ReviewView>,
}

/// Detailed product data for the show page.
#[derive(Debug, Clone)]
pub struct ProductDetailView {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub category_name: String,
    pub category_slug_url: String,
    pub image_url: String,
    pub gallery: Vec<String>,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: u32,
    pub stock: i32,
    pub in_stock: bool,
    pub sold_count: i32,
    pub views_count: i32,
    pub youtube_embed_url: Option<String>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/category.html")]
pub struct CategoryTemplate {
    pub page: PageContext,
    pub category: Category,
    pub products: Vec<ProductCardView>,
    pub current_page: i64,
    pub total_pages: i64,
}

fn parse_price(value: Option<&str>) -> Option<Price> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<Decimal>().ok().map(Price::new)
}

/// Display the product listing with search, filters, and pagination.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<ListQuery>,
) -> Result<ProductsIndexTemplate> {
    let repo = ProductRepository::new(state.pool());

    let all_categories = repo.list_categories(None).await?;
    let category_id = query
        .category
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|slug| all_categories.iter().find(|c| c.slug == slug))
        .map(|c| c.id);

    let filter = ProductFilter {
        q: Some(query.q.clone()).filter(|q| !q.trim().is_empty()),
        category_id,
        min_price: parse_price(query.min_price.as_deref()),
        max_price: parse_price(query.max_price.as_deref()),
        sort: ProductSort::from_query(Some(query.sort.as_str())),
    };

    let result = repo.search(&filter, query.page.unwrap_or(1)).await?;
    let page = PageContext::build(&state, &session, user).await;

    Ok(ProductsIndexTemplate {
        page,
        products: result.products.iter().map(ProductCardView::from).collect(),
        all_categories,
        q: query.q,
        selected_category: query.category.unwrap_or_default(),
        min_price: query.min_price.unwrap_or_default(),
        max_price: query.max_price.unwrap_or_default(),
        sort: query.sort,
        total: result.total,
        current_page: result.page,
        total_pages: result.total_pages,
    })
}

/// Display a product detail page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let repo = ProductRepository::new(state.pool());

    let product = repo
        .get_active_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;

    repo.increment_views(product.id).await?;

    let reviews_repo = ReviewRepository::new(state.pool());
    let reviews = reviews_repo.list_approved(product.id).await?;
    let ratings = reviews_repo.approved_ratings(product.id).await?;

    let user_review = match &user {
        Some(u) => reviews_repo
            .find_by_product_and_user(product.id, u.id)
            .await?
            .as_ref()
            .map(ReviewView::from),
        None => None,
    };

    let related = repo.related(product.category_id, product.id, 4).await?;
    let gallery = repo
        .images(product.id)
        .await?
        .into_iter()
        .map(|img| img.image_url)
        .collect();

    let detail = ProductDetailView {
        id: product.id.as_i32(),
        slug: product.slug.clone(),
        name: product.name.clone(),
        description: product.description.clone(),
        category_name: product.category_name.clone(),
        category_slug_url: format!("/category/{}", product.category_slug),
        image_url: product.image_url.clone(),
        gallery,
        price: product.final_price().display(),
        original_price: product.sale_price.map(|_| product.price.display()),
        discount_percent: product.discount_percent(),
        stock: product.stock,
        in_stock: product.stock > 0,
        sold_count: product.sold_count,
        views_count: product.views_count + 1,
        youtube_embed_url: product.youtube_embed_url(),
    };

    let page = PageContext::build(&state, &session, user).await;

    Ok(ProductShowTemplate {
        page,
        product: detail,
        reviews: reviews.iter().map(ReviewView::from).collect(),
        average_rating: average_rating(&ratings),
        review_count: reviews.len(),
        related: related.iter().map(ProductCardView::from).collect(),
        user_review,
    })
}

/// Display a category's products.
#[instrument(skip(state, session, user))]
pub async fn by_category(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<CategoryTemplate> {
    let repo = ProductRepository::new(state.pool());

    let category = repo
        .get_category_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let filter = ProductFilter {
        category_id: Some(category.id),
        ..ProductFilter::default()
    };
    let result = repo.search(&filter, query.page.unwrap_or(1)).await?;

    let page = PageContext::build(&state, &session, user).await;

    Ok(CategoryTemplate {
        page,
        category,
        products: result.products.iter().map(ProductCardView::from).collect(),
        current_page: result.page,
        total_pages: result.total_pages,
    })
}

/// Review form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: i16,
    pub comment: String,
}

/// Handle review submission. One review per user per product.
#[instrument(skip(state, session, form))]
pub async fn add_review(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<i32>,
    Form(form): Form<ReviewForm>,
) -> Result<Response> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get_active_by_id(ProductId::new(product_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let redirect = Redirect::to(&product.url());

    if !(1..=5).contains(&form.rating) {
        flash::error(&session, "Rating must be between 1 and 5.").await;
        return Ok(redirect.into_response());
    }

    let result = ReviewRepository::new(state.pool())
        .create(product.id, user.id, form.rating, form.comment.trim())
        .await;

    match result {
        Ok(_) => flash::success(&session, "Thanks for your review!").await,
        Err(RepositoryError::Conflict(_)) => {
            flash::warning(&session, "You have already reviewed this product.").await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(redirect.into_response())
}
