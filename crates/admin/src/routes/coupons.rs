//! Coupon overview page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::DiscountType;

use crate::db::coupons::CouponRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::context::AdminContext;
use crate::state::AppState;

/// One row of the coupon table.
#[derive(Debug, Clone)]
pub struct CouponRowView {
    pub code: String,
    pub discount: String,
    pub min_order: String,
    pub usage: String,
    pub valid_from: chrono::DateTime<Utc>,
    pub valid_to: chrono::DateTime<Utc>,
    pub is_valid_now: bool,
}

/// Coupon overview template.
#[derive(Template, WebTemplate)]
#[template(path = "coupons/index.html")]
pub struct CouponsTemplate {
    pub ctx: AdminContext,
    pub coupons: Vec<CouponRowView>,
}

/// Coupon listing handler.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(admin): RequireAdmin,
) -> Result<CouponsTemplate> {
    let coupons = CouponRepository::new(state.pool()).list().await?;
    let now = Utc::now();

    let rows = coupons
        .iter()
        .map(|c| {
            let discount = match c.discount_type {
                DiscountType::Percent => match c.max_discount {
                    Some(cap) => format!("{}% (max {})", c.discount_value, cap.display()),
                    None => format!("{}%", c.discount_value),
                },
                DiscountType::Fixed => mobigear_core::Price::new(c.discount_value).display(),
            };
            CouponRowView {
                code: c.code.clone(),
                discount,
                min_order: c.min_order_amount.display(),
                usage: format!("{}/{}", c.used_count, c.usage_limit),
                valid_from: c.valid_from,
                valid_to: c.valid_to,
                is_valid_now: c.is_currently_valid(now),
            }
        })
        .collect();

    let ctx = AdminContext::build(&session, &admin, "/coupons").await;

    Ok(CouponsTemplate { ctx, coupons: rows })
}
