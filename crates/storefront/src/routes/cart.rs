//! Cart page and cart mutation handlers.
//!
//! Mutations answer both regular form posts (flash + redirect) and AJAX
//! requests (JSON), distinguished by the `X-Requested-With` header.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::ProductId;

use crate::db::coupons::CouponRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::OptionalAuth;
use crate::routes::context::PageContext;
use crate::services::cart::{self, CartService, ResolvedCart};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub product_id: i32,
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub stock: i32,
}

/// Cart display data.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&ResolvedCart> for CartView {
    fn from(cart: &ResolvedCart) -> Self {
        Self {
            items: cart
                .items
                .iter()
                .map(|item| CartItemView {
                    product_id: item.product.id.as_i32(),
                    name: item.product.name.clone(),
                    url: item.product.url(),
                    image_url: item.product.image_url.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price().display(),
                    line_total: item.line_total().display(),
                    stock: item.product.stock,
                })
                .collect(),
            subtotal: cart.subtotal().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub coupon_code: Option<String>,
    pub discount: Option<String>,
    pub total_after_discount: String,
}

fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Display the cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<CartShowTemplate> {
    let service = CartService::new(state.pool());
    let session_cart = cart::load_cart(&session).await;
    let resolved = service.resolve(&session_cart).await?;
    let subtotal = resolved.subtotal();

    let coupon = service.resolve_coupon(&session, subtotal).await?;
    let (coupon_code, discount) = match &coupon {
        Some((coupon, discount)) => (Some(coupon.code.clone()), Some(*discount)),
        None => (None, None),
    };

    let total_after_discount = subtotal
        .saturating_sub(discount.unwrap_or(mobigear_core::Price::ZERO))
        .display();

    let page = PageContext::build(&state, &session, user).await;

    Ok(CartShowTemplate {
        page,
        cart: CartView::from(&resolved),
        coupon_code,
        discount: discount.map(|d| d.display()),
        total_after_discount,
    })
}

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub quantity: Option<u32>,
    /// `"true"` replaces the line quantity instead of adding to it.
    #[serde(default)]
    pub r#override: String,
}

/// Add a product to the cart.
#[instrument(skip(state, session, headers, form))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(product_id): Path<i32>,
    Form(form): Form<AddForm>,
) -> Result<Response> {
    let product_id = ProductId::new(product_id);
    let product = ProductRepository::new(state.pool())
        .get_active_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let quantity = form.quantity.unwrap_or(1).max(1);
    let override_quantity = form.r#override == "true";

    let mut session_cart = cart::load_cart(&session).await;
    let requested = if override_quantity {
        quantity
    } else {
        session_cart.quantity_of(product_id) + quantity
    };

    if i64::from(requested) > i64::from(product.stock) {
        let message = format!("Only {} left in stock!", product.stock);
        if is_ajax(&headers) {
            return Ok(Json(json!({"status": "error", "message": message})).into_response());
        }
        flash::error(&session, message).await;
        return Ok(Redirect::to(&product.url()).into_response());
    }

    session_cart.add(product_id, quantity, override_quantity);
    cart::save_cart(&session, &session_cart).await?;

    let message = format!("Added {} to your cart!", product.name);

    if is_ajax(&headers) {
        let resolved = CartService::new(state.pool()).resolve(&session_cart).await?;
        return Ok(Json(json!({
            "status": "success",
            "message": message,
            "cart_count": resolved.item_count(),
            "cart_total": resolved.subtotal().display(),
        }))
        .into_response());
    }

    flash::success(&session, message).await;
    Ok(Redirect::to("/cart").into_response())
}

/// Remove a product from the cart.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(product_id): Path<i32>,
) -> Result<Response> {
    let mut session_cart = cart::load_cart(&session).await;
    session_cart.remove(ProductId::new(product_id));
    cart::save_cart(&session, &session_cart).await?;

    if is_ajax(&headers) {
        let resolved = CartService::new(state.pool()).resolve(&session_cart).await?;
        return Ok(Json(json!({
            "status": "success",
            "cart_count": resolved.item_count(),
            "cart_total": resolved.subtotal().display(),
        }))
        .into_response());
    }

    flash::info(&session, "Item removed from your cart.").await;
    Ok(Redirect::to("/cart").into_response())
}

/// Coupon form data.
#[derive(Debug, Deserialize)]
pub struct CouponForm {
    #[serde(default)]
    pub coupon_code: String,
}

/// Apply a coupon code to the cart.
#[instrument(skip(state, session, form))]
pub async fn apply_coupon(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CouponForm>,
) -> Result<Response> {
    let code = form.coupon_code.trim().to_uppercase();
    let redirect = Redirect::to("/cart");

    if code.is_empty() {
        flash::error(&session, "Please enter a coupon code.").await;
        return Ok(redirect.into_response());
    }

    let Some(coupon) = CouponRepository::new(state.pool()).get_by_code(&code).await? else {
        flash::error(&session, "That coupon code does not exist.").await;
        return Ok(redirect.into_response());
    };

    if !coupon.is_valid(chrono::Utc::now()) {
        flash::error(&session, "That coupon is no longer valid.").await;
        return Ok(redirect.into_response());
    }

    let service = CartService::new(state.pool());
    let session_cart = cart::load_cart(&session).await;
    let subtotal = service.resolve(&session_cart).await?.subtotal();

    if subtotal < coupon.min_order_amount {
        flash::error(
            &session,
            format!(
                "Orders must be at least {} to use this coupon.",
                coupon.min_order_amount.display()
            ),
        )
        .await;
        return Ok(redirect.into_response());
    }

    cart::apply_coupon_code(&session, &code).await?;
    let discount = coupon.calculate_discount(subtotal);
    flash::success(
        &session,
        format!("Coupon applied! You save {}.", discount.display()),
    )
    .await;

    Ok(redirect.into_response())
}

/// Remove the applied coupon.
#[instrument(skip(session))]
pub async fn remove_coupon(session: Session) -> Response {
    cart::remove_coupon_code(&session).await;
    flash::info(&session, "Coupon removed.").await;
    Redirect::to("/cart").into_response()
}
