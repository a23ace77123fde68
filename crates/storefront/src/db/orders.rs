//! Order repository: payment methods, order creation, history, and cancellation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use mobigear_core::{
    CouponId, OrderId, OrderItemId, OrderStatus, PaymentMethodId, Price, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, PaymentMethod};

#[derive(Debug, sqlx::FromRow)]
struct PaymentMethodRow {
    id: i32,
    name: String,
    code: String,
    description: String,
    icon: String,
    is_active: bool,
    bank_name: String,
    bank_account: String,
    bank_holder: String,
}

impl From<PaymentMethodRow> for PaymentMethod {
    fn from(row: PaymentMethodRow) -> Self {
        Self {
            id: PaymentMethodId::new(row.id),
            name: row.name,
            code: row.code,
            description: row.description,
            icon: row.icon,
            is_active: row.is_active,
            bank_name: row.bank_name,
            bank_account: row.bank_account,
            bank_holder: row.bank_holder,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    full_name: String,
    phone: String,
    email: String,
    address: String,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    note: String,
    payment_method_id: Option<i32>,
    payment_method_name: Option<String>,
    is_paid: bool,
    subtotal: Price,
    shipping_fee: Price,
    coupon_id: Option<i32>,
    discount: Price,
    total: Price,
    qr_code_svg: Option<String>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            full_name: row.full_name,
            phone: row.phone,
            email: row.email,
            address: row.address,
            latitude: row.latitude,
            longitude: row.longitude,
            note: row.note,
            payment_method_id: row.payment_method_id.map(PaymentMethodId::new),
            payment_method_name: row.payment_method_name,
            is_paid: row.is_paid,
            subtotal: row.subtotal,
            shipping_fee: row.shipping_fee,
            coupon_id: row.coupon_id.map(CouponId::new),
            discount: row.discount,
            total: row.total,
            qr_code_svg: row.qr_code_svg,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const ORDER_SELECT: &str = r"
    SELECT o.id, o.user_id, o.full_name, o.phone, o.email, o.address,
           o.latitude, o.longitude, o.note, o.payment_method_id,
           m.name AS payment_method_name, o.is_paid, o.subtotal, o.shipping_fee,
           o.coupon_id, o.discount, o.total, o.qr_code_svg, o.status,
           o.created_at, o.updated_at
    FROM orders o
    LEFT JOIN payment_methods m ON m.id = o.payment_method_id
";

/// One line of a new order.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price frozen at purchase time.
    pub price: Price,
}

/// Everything needed to create an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub note: String,
    pub payment_method_id: PaymentMethodId,
    pub subtotal: Price,
    pub shipping_fee: Price,
    pub coupon_id: Option<CouponId>,
    pub discount: Price,
    pub total: Price,
    pub items: Vec<NewOrderItem>,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active payment methods.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            SELECT id, name, code, description, icon, is_active,
                   bank_name, bank_account, bank_holder
            FROM payment_methods
            WHERE is_active
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an active payment method by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_payment_method(
        &self,
        id: PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentMethodRow>(
            r"
            SELECT id, name, code, description, icon, is_active,
                   bank_name, bank_account, bank_holder
            FROM payment_methods
            WHERE id = $1 AND is_active
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create an order atomically.
    ///
    /// In one transaction: inserts the order and its items, decrements stock
    /// (guarded so it can never go negative), bumps `sold_count`, and
    /// consumes one use of the coupon when present. The guards turn
    /// concurrent overselling into a [`RepositoryError::Conflict`] instead
    /// of a lost update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when stock is insufficient or the
    /// coupon is exhausted; `RepositoryError::Database` for other failures.
    pub async fn create(&self, new_order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (order_id,): (i32,) = sqlx::query_as(
            r"
            INSERT INTO orders (user_id, full_name, phone, email, address,
                                latitude, longitude, note, payment_method_id,
                                subtotal, shipping_fee, coupon_id, discount, total)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(new_order.user_id.as_i32())
        .bind(&new_order.full_name)
        .bind(&new_order.phone)
        .bind(&new_order.email)
        .bind(&new_order.address)
        .bind(new_order.latitude)
        .bind(new_order.longitude)
        .bind(&new_order.note)
        .bind(new_order.payment_method_id.as_i32())
        .bind(new_order.subtotal)
        .bind(new_order.shipping_fee)
        .bind(new_order.coupon_id.map(|c| c.as_i32()))
        .bind(new_order.discount)
        .bind(new_order.total)
        .fetch_one(&mut *tx)
        .await?;

        for item in &new_order.items {
            let quantity = i32::try_from(item.quantity)
                .map_err(|_| RepositoryError::Conflict("quantity out of range".to_owned()))?;

            sqlx::query(
                r"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(item.product_id.as_i32())
            .bind(quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;

            let updated = sqlx::query(
                r"
                UPDATE products
                SET stock = stock - $1, sold_count = sold_count + $1, updated_at = NOW()
                WHERE id = $2 AND stock >= $1
                ",
            )
            .bind(quantity)
            .bind(item.product_id.as_i32())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(RepositoryError::Conflict(
                    "insufficient stock".to_owned(),
                ));
            }
        }

        if let Some(coupon_id) = new_order.coupon_id {
            let updated = sqlx::query(
                r"
                UPDATE coupons
                SET used_count = used_count + 1
                WHERE id = $1 AND used_count < usage_limit
                ",
            )
            .bind(coupon_id.as_i32())
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(RepositoryError::Conflict("coupon exhausted".to_owned()));
            }
        }

        tx.commit().await?;

        self.get(OrderId::new(order_id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Store the generated bank-transfer QR code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_qr_code(&self, id: OrderId, svg: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET qr_code_svg = $1 WHERE id = $2")
            .bind(svg)
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Get an order only if it belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = $1 AND o.user_id = $2");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id.as_i32())
            .bind(user_id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("{ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id.as_i32())
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Items on an order, with product name and slug for display.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct ItemRow {
            id: i32,
            order_id: i32,
            product_id: i32,
            product_name: String,
            product_slug: String,
            quantity: i32,
            price: Price,
        }

        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.id, i.order_id, i.product_id, p.name AS product_name,
                   p.slug AS product_slug, i.quantity, i.price
            FROM order_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY i.id
            ",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| OrderItem {
                id: OrderItemId::new(r.id),
                order_id: OrderId::new(r.order_id),
                product_id: ProductId::new(r.product_id),
                product_name: r.product_name,
                product_slug: r.product_slug,
                quantity: r.quantity,
                price: r.price,
            })
            .collect())
    }

    /// Cancel an order and restore the stock its items consumed.
    ///
    /// The caller is responsible for checking that the order is still
    /// cancellable; this only performs the state change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn cancel(&self, id: OrderId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE products p
            SET stock = p.stock + i.quantity,
                sold_count = GREATEST(p.sold_count - i.quantity, 0),
                updated_at = NOW()
            FROM order_items i
            WHERE i.order_id = $1 AND i.product_id = p.id
            ",
        )
        .bind(id.as_i32())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE orders SET status = 'cancelled', updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }
}
