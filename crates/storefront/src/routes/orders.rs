//! Order history, detail, success, and cancellation handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::OrderId;

use crate::db::orders::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::RequireAuth;
use crate::models::order::{Order, OrderItem};
use crate::routes::context::PageContext;
use crate::services::checkout::CheckoutService;
use crate::state::AppState;

/// Order summary display data.
#[derive(Debug, Clone)]
pub struct OrderSummaryView {
    pub id: i32,
    pub total: String,
    pub status: &'static str,
    pub status_code: String,
    pub is_cancellable: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Order> for OrderSummaryView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            total: order.total.display(),
            status: order.status.label(),
            status_code: order.status.to_string(),
            is_cancellable: order.status.is_cancellable(),
            created_at: order.created_at,
        }
    }
}

/// Order line display data.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_name: String,
    pub product_url: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            product_url: format!("/products/{}", item.product_slug),
            quantity: item.quantity,
            unit_price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Full order display data.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub id: i32,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub note: String,
    pub payment_method: String,
    pub is_paid: bool,
    pub subtotal: String,
    pub shipping_fee: String,
    pub discount: String,
    pub has_discount: bool,
    pub total: String,
    pub qr_code_svg: Option<String>,
    pub status: &'static str,
    pub status_code: String,
    pub is_cancellable: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Order> for OrderDetailView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            full_name: order.full_name.clone(),
            phone: order.phone.clone(),
            email: order.email.clone(),
            address: order.address.clone(),
            note: order.note.clone(),
            payment_method: order
                .payment_method_name
                .clone()
                .unwrap_or_else(|| "-".to_owned()),
            is_paid: order.is_paid,
            subtotal: order.subtotal.display(),
            shipping_fee: order.shipping_fee.display(),
            discount: order.discount.display(),
            has_discount: !order.discount.is_zero(),
            total: order.total.display(),
            qr_code_svg: order.qr_code_svg.clone(),
            status: order.status.label(),
            status_code: order.status.to_string(),
            is_cancellable: order.status.is_cancellable(),
            created_at: order.created_at,
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/history.html")]
pub struct OrderHistoryTemplate {
    pub page: PageContext,
    pub orders: Vec<OrderSummaryView>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub page: PageContext,
    pub order: OrderDetailView,
    pub items: Vec<OrderItemView>,
}

/// Order success page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/success.html")]
pub struct OrderSuccessTemplate {
    pub page: PageContext,
    pub order: OrderDetailView,
}

/// The customer's order history, newest first.
#[instrument(skip(state, session, user))]
pub async fn history(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<OrderHistoryTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    let page = PageContext::build(&state, &session, Some(user)).await;

    Ok(OrderHistoryTemplate {
        page,
        orders: orders.iter().map(OrderSummaryView::from).collect(),
    })
}

async fn owned_order(state: &AppState, order_id: i32, user_id: mobigear_core::UserId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get_for_user(OrderId::new(order_id), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))
}

/// Order detail page (owner only).
#[instrument(skip(state, session, user))]
pub async fn detail(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<i32>,
) -> Result<OrderDetailTemplate> {
    let order = owned_order(&state, order_id, user.id).await?;
    let items = OrderRepository::new(state.pool()).items(order.id).await?;

    let page = PageContext::build(&state, &session, Some(user)).await;

    Ok(OrderDetailTemplate {
        page,
        order: OrderDetailView::from(&order),
        items: items.iter().map(OrderItemView::from).collect(),
    })
}

/// Order placed confirmation page.
#[instrument(skip(state, session, user))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<i32>,
) -> Result<OrderSuccessTemplate> {
    let order = owned_order(&state, order_id, user.id).await?;
    let page = PageContext::build(&state, &session, Some(user)).await;

    Ok(OrderSuccessTemplate {
        page,
        order: OrderDetailView::from(&order),
    })
}

/// Cancel an order while it is still pending or approved.
#[instrument(skip(state, session, user))]
pub async fn cancel(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<i32>,
) -> Result<Response> {
    let order = owned_order(&state, order_id, user.id).await?;

    if !order.status.is_cancellable() {
        flash::error(&session, "This order can no longer be cancelled.").await;
        return Ok(Redirect::to(&format!("/orders/{order_id}")).into_response());
    }

    CheckoutService::new(state.pool()).cancel_order(&order).await?;

    flash::info(&session, "Order cancelled.").await;
    Ok(Redirect::to("/orders/history").into_response())
}
