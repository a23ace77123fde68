//! Product management handlers: listing, create, edit, soft delete.

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

use mobigear_core::{CategoryId, Price, ProductId};

use crate::db::RepositoryError;
use crate::db::products::{
    CategoryOption, ManagedProduct, ProductInput, ProductManageFilter, ProductRepository,
};
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::RequireAdmin;
use crate::routes::context::AdminContext;
use crate::state::AppState;

/// Listing filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub search: String,
}

/// Product listing row.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i32,
    pub name: String,
    pub category_name: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub sold_count: i32,
}

impl From<&ManagedProduct> for ProductRowView {
    fn from(p: &ManagedProduct) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            category_name: p.category_name.clone(),
            price: p.price.display(),
            sale_price: p.sale_price.map(|s| s.display()),
            stock: p.stock,
            is_active: p.is_active,
            is_featured: p.is_featured,
            sold_count: p.sold_count,
        }
    }
}

/// Product management page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub ctx: AdminContext,
    pub products: Vec<ProductRowView>,
    pub categories: Vec<CategoryOption>,
    pub category_filter: String,
    pub search: String,
}

/// Values shown in the product form.
#[derive(Debug, Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub slug: String,
    pub category_id: i32,
    pub description: String,
    pub price: String,
    pub sale_price: String,
    pub image_url: String,
    pub video_url: String,
    pub stock: i32,
    pub is_active: bool,
    pub is_featured: bool,
}

impl From<&ManagedProduct> for ProductFormView {
    fn from(p: &ManagedProduct) -> Self {
        Self {
            name: p.name.clone(),
            slug: p.slug.clone(),
            category_id: p.category_id,
            description: p.description.clone(),
            price: p.price.amount().to_string(),
            sale_price: p
                .sale_price
                .map(|s| s.amount().to_string())
                .unwrap_or_default(),
            image_url: p.image_url.clone(),
            video_url: p.video_url.clone().unwrap_or_default(),
            stock: p.stock,
            is_active: p.is_active,
            is_featured: p.is_featured,
        }
    }
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub ctx: AdminContext,
    pub categories: Vec<CategoryOption>,
    pub form: ProductFormView,
    pub action: String,
    pub heading: String,
    pub error: Option<String>,
}

/// Product form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub slug: String,
    pub category_id: i32,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub video_url: String,
    pub stock: i32,
    #[serde(default)]
    pub is_active: Option<String>,
    #[serde(default)]
    pub is_featured: Option<String>,
}

impl ProductForm {
    fn parse(&self) -> std::result::Result<ProductInput, String> {
        if self.name.trim().is_empty() {
            return Err("Name is required.".to_owned());
        }
        if self.slug.trim().is_empty() {
            return Err("Slug is required.".to_owned());
        }

        let price = self
            .price
            .trim()
            .parse::<Decimal>()
            .map(Price::new)
            .map_err(|_| "Price must be a number.".to_owned())?;

        let sale_price = match self.sale_price.trim() {
            "" => None,
            raw => Some(
                raw.parse::<Decimal>()
                    .map(Price::new)
                    .map_err(|_| "Sale price must be a number.".to_owned())?,
            ),
        };

        if let Some(sale) = sale_price
            && sale >= price
        {
            return Err("Sale price must be below the list price.".to_owned());
        }

        if self.stock < 0 {
            return Err("Stock cannot be negative.".to_owned());
        }

        Ok(ProductInput {
            name: self.name.trim().to_owned(),
            slug: self.slug.trim().to_owned(),
            category_id: CategoryId::new(self.category_id),
            description: self.description.trim().to_owned(),
            price,
            sale_price,
            image_url: self.image_url.trim().to_owned(),
            video_url: Some(self.video_url.trim().to_owned()).filter(|v| !v.is_empty()),
            stock: self.stock,
            is_active: self.is_active.is_some(),
            is_featured: self.is_featured.is_some(),
        })
    }

    fn echo(&self) -> ProductFormView {
        ProductFormView {
            name: self.name.clone(),
            slug: self.slug.clone(),
            category_id: self.category_id,
            description: self.description.clone(),
            price: self.price.clone(),
            sale_price: self.sale_price.clone(),
            image_url: self.image_url.clone(),
            video_url: self.video_url.clone(),
            stock: self.stock,
            is_active: self.is_active.is_some(),
            is_featured: self.is_featured.is_some(),
        }
    }
}

/// Product listing with category/name filters.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<ProductListQuery>,
) -> Result<ProductsTemplate> {
    let repo = ProductRepository::new(state.pool());

    let filter = ProductManageFilter {
        category_id: query.category.parse::<i32>().ok().map(CategoryId::new),
        search: Some(query.search.clone()).filter(|s| !s.is_empty()),
    };

    let products = repo.list(&filter).await?;
    let categories = repo.list_categories().await?;
    let ctx = AdminContext::build(&session, &admin, "/products").await;

    Ok(ProductsTemplate {
        ctx,
        products: products.iter().map(ProductRowView::from).collect(),
        categories,
        category_filter: query.category,
        search: query.search,
    })
}

/// Display the create form.
#[instrument(skip(state, session, admin))]
pub async fn new_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<ProductFormTemplate> {
    let categories = ProductRepository::new(state.pool()).list_categories().await?;
    let ctx = AdminContext::build(&session, &admin, "/products").await;

    Ok(ProductFormTemplate {
        ctx,
        categories,
        form: ProductFormView {
            is_active: true,
            stock: 0,
            ..ProductFormView::default()
        },
        action: "/products/new".to_owned(),
        heading: "Add product".to_owned(),
        error: None,
    })
}

/// Handle the create form.
#[instrument(skip(state, session, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let repo = ProductRepository::new(state.pool());

    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => {
            return render_form_error(&state, &session, &admin, form, "/products/new", "Add product", message).await;
        }
    };

    match repo.create(&input).await {
        Ok(_) => {
            flash::success(&session, "Product created.").await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            render_form_error(
                &state,
                &session,
                &admin,
                form,
                "/products/new",
                "Add product",
                "That slug is already in use.".to_owned(),
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

/// Display the edit form.
#[instrument(skip(state, session, admin))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<i32>,
) -> Result<ProductFormTemplate> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get(ProductId::new(product_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let categories = repo.list_categories().await?;
    let ctx = AdminContext::build(&session, &admin, "/products").await;

    Ok(ProductFormTemplate {
        ctx,
        categories,
        form: ProductFormView::from(&product),
        action: format!("/products/{product_id}/edit"),
        heading: format!("Edit: {}", product.name),
        error: None,
    })
}

/// Handle the edit form.
#[instrument(skip(state, session, admin, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<i32>,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let repo = ProductRepository::new(state.pool());
    let action = format!("/products/{product_id}/edit");

    let input = match form.parse() {
        Ok(input) => input,
        Err(message) => {
            return render_form_error(&state, &session, &admin, form, &action, "Edit product", message).await;
        }
    };

    match repo.update(ProductId::new(product_id), &input).await {
        Ok(()) => {
            flash::success(&session, "Product updated.").await;
            Ok(Redirect::to("/products").into_response())
        }
        Err(RepositoryError::NotFound) => {
            Err(AppError::NotFound(format!("product {product_id}")))
        }
        Err(RepositoryError::Conflict(_)) => {
            render_form_error(
                &state,
                &session,
                &admin,
                form,
                &action,
                "Edit product",
                "That slug is already in use.".to_owned(),
            )
            .await
        }
        Err(e) => Err(e.into()),
    }
}

/// Soft-delete a product.
#[instrument(skip(state, session, admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(product_id): Path<i32>,
) -> Result<Response> {
    ProductRepository::new(state.pool())
        .soft_delete(ProductId::new(product_id))
        .await?;

    flash::success(&session, "Product removed from the storefront.").await;
    Ok(Redirect::to("/products").into_response())
}

async fn render_form_error(
    state: &AppState,
    session: &Session,
    admin: &crate::models::CurrentAdmin,
    form: ProductForm,
    action: &str,
    heading: &str,
    message: String,
) -> Result<Response> {
    let categories = ProductRepository::new(state.pool()).list_categories().await?;
    let ctx = AdminContext::build(session, admin, "/products").await;

    Ok(ProductFormTemplate {
        ctx,
        categories,
        form: form.echo(),
        action: action.to_owned(),
        heading: heading.to_owned(),
        error: Some(message),
    }
    .into_response())
}
