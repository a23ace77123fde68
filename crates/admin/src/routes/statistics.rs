//! Statistics and reporting page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::reports::ReportRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::AdminContext;
use crate::state::AppState;

/// One month of revenue for the report table.
#[derive(Debug, Clone)]
pub struct MonthlyRevenueView {
    pub month: String,
    pub revenue: String,
    pub order_count: i64,
}

/// One product row of the top-products table.
#[derive(Debug, Clone)]
pub struct TopProductView {
    pub name: String,
    pub units_sold: i64,
    pub revenue: String,
}

/// Revenue per category.
#[derive(Debug, Clone)]
pub struct CategoryRevenueView {
    pub category: String,
    pub revenue: String,
}

/// Order count per status.
#[derive(Debug, Clone)]
pub struct StatusCountView {
    pub status: &'static str,
    pub count: i64,
}

/// Statistics page template.
#[derive(Template, WebTemplate)]
#[template(path = "statistics.html")]
pub struct StatisticsTemplate {
    pub ctx: AdminContext,
    pub monthly_revenue: Vec<MonthlyRevenueView>,
    pub top_products: Vec<TopProductView>,
    pub orders_by_status: Vec<StatusCountView>,
    pub revenue_by_category: Vec<CategoryRevenueView>,
}

/// Statistics page handler.
#[instrument(skip(state, session, admin))]
pub async fn statistics(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<StatisticsTemplate> {
    let reports = ReportRepository::new(state.pool());

    let monthly = reports.monthly_revenue().await?;
    let top = reports.top_products(10).await?;
    let by_status = reports.status_counts().await?;
    let by_category = reports.revenue_by_category().await?;

    let ctx = AdminContext::build(&session, &admin, "/statistics").await;

    Ok(StatisticsTemplate {
        ctx,
        monthly_revenue: monthly
            .iter()
            .map(|m| MonthlyRevenueView {
                month: m.month.format("%m/%Y").to_string(),
                revenue: m.revenue.display(),
                order_count: m.order_count,
            })
            .collect(),
        top_products: top
            .iter()
            .map(|t| TopProductView {
                name: t.name.clone(),
                units_sold: t.units_sold,
                revenue: t.revenue.display(),
            })
            .collect(),
        orders_by_status: by_status
            .iter()
            .map(|s| StatusCountView {
                status: s.status.label(),
                count: s.count,
            })
            .collect(),
        revenue_by_category: by_category
            .iter()
            .map(|c| CategoryRevenueView {
                category: c.category.clone(),
                revenue: c.revenue.display(),
            })
            .collect(),
    })
}
