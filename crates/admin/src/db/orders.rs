//! Order management repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use mobigear_core::{NotificationKind, OrderId, OrderStatus, Price, UserId};

use super::RepositoryError;

/// An order row as the admin panel sees it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ManagedOrder {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub note: String,
    pub payment_method_name: Option<String>,
    pub is_paid: bool,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub discount: Price,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl ManagedOrder {
    /// Typed order id.
    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        OrderId::new(self.id)
    }

    /// Typed customer id.
    #[must_use]
    pub const fn customer_id(&self) -> UserId {
        UserId::new(self.user_id)
    }
}

/// A line on a managed order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ManagedOrderItem {
    pub product_name: String,
    pub quantity: i32,
    pub price: Price,
}

impl ManagedOrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price * u32::try_from(self.quantity).unwrap_or(0)
    }
}

const ORDER_SELECT: &str = r"
    SELECT o.id, o.user_id, u.username, o.full_name, o.phone, o.email,
           o.address, o.note, m.name AS payment_method_name, o.is_paid,
           o.subtotal, o.shipping_fee, o.discount, o.total, o.status,
           o.created_at
    FROM orders o
    JOIN users u ON u.id = o.user_id
    LEFT JOIN payment_methods m ON m.id = o.payment_method_id
";

/// Repository for order management.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<OrderStatus>,
    ) -> Result<Vec<ManagedOrder>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(ORDER_SELECT);
        builder.push(" WHERE TRUE");
        if let Some(status) = status {
            builder.push(" AND o.status = ");
            builder.push_bind(status);
        }
        builder.push(" ORDER BY o.created_at DESC");

        let rows: Vec<ManagedOrder> = builder.build_query_as().fetch_all(self.pool).await?;
        Ok(rows)
    }

    /// Get one order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<ManagedOrder>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1");
        let row = sqlx::query_as::<_, ManagedOrder>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// Items on an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<ManagedOrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ManagedOrderItem>(
            r"
            SELECT p.name AS product_name, i.quantity, i.price
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY i.id
            ",
        )
        .bind(id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Set an order's status (any status; there is no transition graph) and
    /// notify the customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING user_id
            ",
        )
        .bind(status)
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let Some((user_id,)) = row else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query(
            r"
            INSERT INTO notifications (user_id, title, message, kind, link)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(user_id)
        .bind("Order update")
        .bind(format!("Order #{id} is now: {}", status.label()))
        .bind(NotificationKind::Order)
        .bind(format!("/orders/{id}"))
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
