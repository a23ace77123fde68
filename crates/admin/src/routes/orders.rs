//! Order management handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::{OrderId, OrderStatus};

use crate::db::orders::{ManagedOrder, ManagedOrderItem, OrderRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::flash;
use crate::middleware::RequireAdmin;
use crate::routes::context::AdminContext;
use crate::state::AppState;

/// Listing filter query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    #[serde(default)]
    pub status: String,
}

/// One row of the order table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub customer: String,
    pub full_name: String,
    pub total: String,
    pub is_paid: bool,
    pub status: &'static str,
    pub status_code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&ManagedOrder> for OrderRowView {
    fn from(order: &ManagedOrder) -> Self {
        Self {
            id: order.id,
            customer: order.username.clone(),
            full_name: order.full_name.clone(),
            total: order.total.display(),
            is_paid: order.is_paid,
            status: order.status.label(),
            status_code: order.status.to_string(),
            created_at: order.created_at,
        }
    }
}

/// A status choice for the filter and update dropdowns.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub code: String,
    pub label: &'static str,
}

fn status_options() -> Vec<StatusOption> {
    OrderStatus::ALL
        .iter()
        .map(|s| StatusOption {
            code: s.to_string(),
            label: s.label(),
        })
        .collect()
}

/// Order listing template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub ctx: AdminContext,
    pub orders: Vec<OrderRowView>,
    pub statuses: Vec<StatusOption>,
    pub status_filter: String,
}

/// Detail view of one order.
#[derive(Debug, Clone)]
pub struct OrderDetailView {
    pub id: i32,
    pub customer: String,
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
    pub total: String,
    pub status_code: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// One line of the order detail.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&ManagedOrderItem> for OrderItemView {
    fn from(item: &ManagedOrderItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderDetailTemplate {
    pub ctx: AdminContext,
    pub order: OrderDetailView,
    pub items: Vec<OrderItemView>,
    pub statuses: Vec<StatusOption>,
}

/// Order listing with a status filter.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<OrderListQuery>,
) -> Result<OrdersTemplate> {
    let status = query.status.parse::<OrderStatus>().ok();
    let orders = OrderRepository::new(state.pool()).list(status).await?;
    let ctx = AdminContext::build(&session, &admin, "/orders").await;

    Ok(OrdersTemplate {
        ctx,
        orders: orders.iter().map(OrderRowView::from).collect(),
        statuses: status_options(),
        status_filter: query.status,
    })
}

/// Order detail with its items and the status update form.
#[instrument(skip(state, session, admin))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<i32>,
) -> Result<OrderDetailTemplate> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(OrderId::new(order_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    let items = repo.items(order.order_id()).await?;

    let ctx = AdminContext::build(&session, &admin, "/orders").await;

    Ok(OrderDetailTemplate {
        ctx,
        order: OrderDetailView {
            id: order.id,
            customer: order.username.clone(),
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
            total: order.total.display(),
            status_code: order.status.to_string(),
            created_at: order.created_at,
        },
        items: items.iter().map(OrderItemView::from).collect(),
        statuses: status_options(),
    })
}

/// Status update form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Set an order's status. Any status is allowed; the customer gets a
/// notification with a deep link to the order.
#[instrument(skip(state, session, admin, form))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<i32>,
    Form(form): Form<StatusForm>,
) -> Result<Response> {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        flash::error(&session, "Unknown order status.").await;
        return Ok(Redirect::to(&format!("/orders/{order_id}")).into_response());
    };

    OrderRepository::new(state.pool())
        .set_status(OrderId::new(order_id), status)
        .await?;

    flash::success(&session, format!("Order status set to {}.", status.label())).await;
    Ok(Redirect::to(&format!("/orders/{order_id}")).into_response())
}
