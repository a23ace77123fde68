//! Aggregate reporting queries for the dashboard and statistics pages.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mobigear_core::{OrderStatus, Price};

use super::RepositoryError;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub total_users: i64,
    pub total_products: i64,
    pub total_orders: i64,
    /// Revenue across completed orders.
    pub total_revenue: Price,
    pub today_orders: i64,
    /// Completed revenue from orders created today.
    pub today_revenue: Price,
    pub pending_orders: i64,
}

/// One day of completed revenue.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyRevenue {
    pub day: DateTime<Utc>,
    pub revenue: Price,
}

/// One month of completed revenue.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyRevenue {
    pub month: DateTime<Utc>,
    pub revenue: Price,
    pub order_count: i64,
}

/// Best-selling product by lifetime units.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BestSeller {
    pub name: String,
    pub sold_count: i32,
}

/// Top product in completed orders.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopProduct {
    pub name: String,
    pub units_sold: i64,
    pub revenue: Price,
}

/// Completed revenue attributed to one category.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: Price,
}

/// Order count per status.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Repository for reporting aggregates.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Headline dashboard numbers in one round trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            total_users: i64,
            total_products: i64,
            total_orders: i64,
            total_revenue: Option<Decimal>,
            today_orders: i64,
            today_revenue: Option<Decimal>,
            pending_orders: i64,
        }

        let row = sqlx::query_as::<_, Row>(
            r"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM products WHERE is_active) AS total_products,
                (SELECT COUNT(*) FROM orders) AS total_orders,
                (SELECT SUM(total) FROM orders WHERE status = 'completed') AS total_revenue,
                (SELECT COUNT(*) FROM orders
                   WHERE created_at >= date_trunc('day', NOW())) AS today_orders,
                (SELECT SUM(total) FROM orders
                   WHERE status = 'completed'
                     AND created_at >= date_trunc('day', NOW())) AS today_revenue,
                (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardMetrics {
            total_users: row.total_users,
            total_products: row.total_products,
            total_orders: row.total_orders,
            total_revenue: Price::new(row.total_revenue.unwrap_or_default()),
            today_orders: row.today_orders,
            today_revenue: Price::new(row.today_revenue.unwrap_or_default()),
            pending_orders: row.pending_orders,
        })
    }

    /// Completed revenue per day over the last `days` days.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_revenue(&self, days: i32) -> Result<Vec<DailyRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailyRevenue>(
            r"
            SELECT date_trunc('day', created_at) AS day, SUM(total) AS revenue
            FROM orders
            WHERE status = 'completed'
              AND created_at >= NOW() - ($1 || ' days')::interval
            GROUP BY day
            ORDER BY day
            ",
        )
        .bind(days.to_string())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Completed revenue and order count per month.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            r"
            SELECT date_trunc('month', created_at) AS month,
                   SUM(total) AS revenue,
                   COUNT(*) AS order_count
            FROM orders
            WHERE status = 'completed'
            GROUP BY month
            ORDER BY month
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Top `limit` active products by lifetime units sold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn best_sellers(&self, limit: i64) -> Result<Vec<BestSeller>, RepositoryError> {
        let rows = sqlx::query_as::<_, BestSeller>(
            r"
            SELECT name, sold_count
            FROM products
            WHERE is_active
            ORDER BY sold_count DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Top `limit` products by units inside completed orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(&self, limit: i64) -> Result<Vec<TopProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT p.name, SUM(i.quantity) AS units_sold,
                   SUM(i.price * i.quantity) AS revenue
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            JOIN products p ON p.id = i.product_id
            WHERE o.status = 'completed'
            GROUP BY p.name
            ORDER BY units_sold DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Completed revenue broken down by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_by_category(&self) -> Result<Vec<CategoryRevenue>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRevenue>(
            r"
            SELECT c.name AS category, SUM(i.price * i.quantity) AS revenue
            FROM order_items i
            JOIN orders o ON o.id = i.order_id
            JOIN products p ON p.id = i.product_id
            JOIN categories c ON c.id = p.category_id
            WHERE o.status = 'completed'
            GROUP BY c.name
            ORDER BY revenue DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Order counts per status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<Vec<StatusCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
