//! Dashboard: headline metrics, revenue chart data, best sellers, and the
//! latest orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::orders::ManagedOrder;
use crate::db::reports::{BestSeller, ReportRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::AdminContext;
use crate::state::AppState;

/// Days of history shown in the revenue chart.
const REVENUE_CHART_DAYS: i32 = 30;

/// A point on the revenue chart.
#[derive(Debug, Clone)]
pub struct RevenuePoint {
    pub day: String,
    pub revenue: String,
}

/// One row of the recent orders table.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: i32,
    pub customer: String,
    pub total: String,
    pub status: &'static str,
    pub status_code: String,
}

impl From<&ManagedOrder> for RecentOrderView {
    fn from(order: &ManagedOrder) -> Self {
        Self {
            id: order.id,
            customer: order.username.clone(),
            total: order.total.display(),
            status: order.status.label(),
            status_code: order.status.to_string(),
        }
    }
}

/// A status/count pair for the breakdown widget.
#[derive(Debug, Clone)]
pub struct StatusCountView {
    pub status: &'static str,
    pub status_code: String,
    pub count: i64,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: AdminContext,
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: String,
    pub today_orders: i64,
    pub today_revenue: String,
    pub pending_orders: i64,
    pub daily_revenue: Vec<RevenuePoint>,
    pub best_sellers: Vec<BestSeller>,
    pub status_counts: Vec<StatusCountView>,
    pub recent_orders: Vec<RecentOrderView>,
}

/// Dashboard page handler.
#[instrument(skip(state, session, admin))]
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<DashboardTemplate> {
    let reports = ReportRepository::new(state.pool());

    let metrics = reports.dashboard_metrics().await?;
    let daily = reports.daily_revenue(REVENUE_CHART_DAYS).await?;
    let best_sellers = reports.best_sellers(5).await?;
    let status_counts = reports.status_counts().await?;
    let recent = crate::db::orders::OrderRepository::new(state.pool())
        .list(None)
        .await?;

    let ctx = AdminContext::build(&session, &admin, "/").await;

    Ok(DashboardTemplate {
        ctx,
        total_users: metrics.total_users,
        total_products: metrics.total_products,
        total_orders: metrics.total_orders,
        total_revenue: metrics.total_revenue.display(),
        today_orders: metrics.today_orders,
        today_revenue: metrics.today_revenue.display(),
        pending_orders: metrics.pending_orders,
        daily_revenue: daily
            .iter()
            .map(|d| RevenuePoint {
                day: d.day.format("%d/%m").to_string(),
                revenue: d.revenue.display(),
            })
            .collect(),
        best_sellers,
        status_counts: status_counts
            .iter()
            .map(|s| StatusCountView {
                status: s.status.label(),
                status_code: s.status.to_string(),
                count: s.count,
            })
            .collect(),
        recent_orders: recent.iter().take(10).map(RecentOrderView::from).collect(),
    })
}
