//! Demo data seeding.
//!
//! Idempotent: every insert is guarded with `ON CONFLICT DO NOTHING` so the
//! command can run on a database that is already seeded.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};

use mobigear_core::Price;

use super::{CommandError, connect};

struct SeedProduct {
    name: &'static str,
    price: i64,
    sale_price: Option<i64>,
    category: usize,
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Ốp lưng", "op-lung"),
    ("Tai nghe", "tai-nghe"),
    ("Sạc & Cáp", "sac-cap"),
    ("Pin dự phòng", "pin-du-phong"),
    ("Miếng dán màn hình", "mieng-dan"),
    ("Phụ kiện khác", "phu-kien-khac"),
];

const PRODUCTS: &[SeedProduct] = &[
    // Ốp lưng
    SeedProduct { name: "Ốp lưng iPhone 15 Pro Max trong suốt", price: 150_000, sale_price: Some(99_000), category: 0 },
    SeedProduct { name: "Ốp lưng Samsung S24 Ultra chống sốc", price: 250_000, sale_price: Some(179_000), category: 0 },
    SeedProduct { name: "Ốp lưng Xiaomi 14 Pro silicon", price: 120_000, sale_price: None, category: 0 },
    SeedProduct { name: "Ốp lưng OPPO Find X6 Pro cao cấp", price: 200_000, sale_price: Some(150_000), category: 0 },
    // Tai nghe
    SeedProduct { name: "Tai nghe Bluetooth TWS Pro", price: 450_000, sale_price: Some(299_000), category: 1 },
    SeedProduct { name: "Tai nghe AirPods Pro 2 Rep 1:1", price: 650_000, sale_price: Some(499_000), category: 1 },
    SeedProduct { name: "Tai nghe gaming có dây 7.1", price: 350_000, sale_price: None, category: 1 },
    SeedProduct { name: "Tai nghe chụp tai Bluetooth", price: 550_000, sale_price: Some(399_000), category: 1 },
    // Sạc & Cáp
    SeedProduct { name: "Sạc nhanh 65W GaN", price: 450_000, sale_price: Some(350_000), category: 2 },
    SeedProduct { name: "Cáp Type-C to Lightning 2m", price: 150_000, sale_price: None, category: 2 },
    SeedProduct { name: "Sạc không dây 15W", price: 250_000, sale_price: Some(199_000), category: 2 },
    SeedProduct { name: "Hub USB-C 7 in 1", price: 550_000, sale_price: Some(450_000), category: 2 },
    // Pin dự phòng
    SeedProduct { name: "Pin sạc dự phòng 20000mAh", price: 450_000, sale_price: Some(350_000), category: 3 },
    SeedProduct { name: "Pin sạc dự phòng mini 10000mAh", price: 300_000, sale_price: None, category: 3 },
    SeedProduct { name: "Pin sạc nhanh PD 30000mAh", price: 750_000, sale_price: Some(599_000), category: 3 },
    // Miếng dán
    SeedProduct { name: "Kính cường lực iPhone 15 Pro", price: 100_000, sale_price: Some(79_000), category: 4 },
    SeedProduct { name: "Kính cường lực Samsung S24", price: 120_000, sale_price: Some(89_000), category: 4 },
    SeedProduct { name: "Miếng dán hydrogel", price: 80_000, sale_price: None, category: 4 },
    // Phụ kiện khác
    SeedProduct { name: "Giá đỡ điện thoại ô tô", price: 200_000, sale_price: Some(150_000), category: 5 },
    SeedProduct { name: "Gimbal điện thoại 3 trục", price: 1_200_000, sale_price: Some(899_000), category: 5 },
];

/// Seed the database.
///
/// # Errors
///
/// Returns an error when the database is unreachable or an insert fails.
#[allow(clippy::too_many_lines)]
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Seeding database...");

    // Admin account (admin/admin123 for local development)
    let admin_hash = hash("admin123")?;
    sqlx::query(
        r"
        INSERT INTO users (username, email, password_hash, role_id)
        VALUES ('admin', 'admin@example.com', $1,
                (SELECT id FROM roles WHERE name = 'admin'))
        ON CONFLICT (username) DO NOTHING
        ",
    )
    .bind(&admin_hash)
    .execute(&pool)
    .await?;
    tracing::info!("Admin account ready: admin/admin123");

    // Demo customers
    let user_hash = hash("password123")?;
    let demo_users = [
        ("user1", "user1@example.com", "0901234567"),
        ("user2", "user2@example.com", "0902345678"),
        ("user3", "user3@example.com", "0903456789"),
    ];
    for (username, email, phone) in demo_users {
        sqlx::query(
            r"
            INSERT INTO users (username, email, phone, password_hash, role_id)
            VALUES ($1, $2, $3, $4, (SELECT id FROM roles WHERE name = 'user'))
            ON CONFLICT (username) DO NOTHING
            ",
        )
        .bind(username)
        .bind(email)
        .bind(phone)
        .bind(&user_hash)
        .execute(&pool)
        .await?;
    }

    // Categories
    for (name, slug) in CATEGORIES {
        sqlx::query(
            r"
            INSERT INTO categories (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(name)
        .bind(slug)
        .execute(&pool)
        .await?;
    }

    // Products
    for (i, product) in PRODUCTS.iter().enumerate() {
        let (_, category_slug) = CATEGORIES
            .get(product.category)
            .expect("seed category index in range");

        sqlx::query(
            r"
            INSERT INTO products (name, slug, category_id, description, price,
                                  sale_price, stock, is_active, is_featured)
            VALUES ($1, $2,
                    (SELECT id FROM categories WHERE slug = $3),
                    $4, $5, $6, $7, TRUE, $8)
            ON CONFLICT (slug) DO NOTHING
            ",
        )
        .bind(product.name)
        .bind(format!("product-{}", i + 1))
        .bind(category_slug)
        .bind(format!(
            "Mô tả chi tiết cho {}. Sản phẩm chất lượng cao, chính hãng.",
            product.name
        ))
        .bind(Price::from_vnd(product.price))
        .bind(product.sale_price.map(Price::from_vnd))
        .bind(30_i32)
        .bind(i % 3 == 0)
        .execute(&pool)
        .await?;
    }

    // Payment methods
    sqlx::query(
        r"
        INSERT INTO payment_methods (name, code, description, icon, bank_name, bank_account, bank_holder)
        VALUES
            ('Thanh toán khi nhận hàng (COD)', 'cod',
             'Thanh toán tiền mặt khi nhận hàng', 'bi-cash-stack', '', '', ''),
            ('Chuyển khoản ngân hàng', 'bank_transfer',
             'Chuyển khoản qua ngân hàng', 'bi-bank',
             'Vietcombank', '1234567890', 'MOBIGEAR'),
            ('Ví điện tử MoMo', 'momo',
             'Thanh toán qua ví MoMo', 'bi-wallet2', '', '', '')
        ON CONFLICT (code) DO NOTHING
        ",
    )
    .execute(&pool)
    .await?;

    // Coupons: valid for 30 days from seeding
    let valid_from = Utc::now();
    let valid_to = valid_from + Duration::days(30);

    let coupons = [
        ("WELCOME10", "percent", 10_i64, 200_000_i64, Some(50_000_i64), 100_i32),
        ("FREESHIP", "fixed", 30_000, 300_000, None, 50),
        ("SALE20", "percent", 20, 500_000, Some(100_000), 30),
    ];
    for (code, kind, value, min_order, max_discount, usage_limit) in coupons {
        sqlx::query(
            r"
            INSERT INTO coupons (code, discount_type, discount_value, min_order_amount,
                                 max_discount, usage_limit, valid_from, valid_to)
            VALUES ($1, $2::discount_type, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (code) DO NOTHING
            ",
        )
        .bind(code)
        .bind(kind)
        .bind(Price::from_vnd(value).amount())
        .bind(Price::from_vnd(min_order))
        .bind(max_discount.map(Price::from_vnd))
        .bind(usage_limit)
        .bind(valid_from)
        .bind(valid_to)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

fn hash(password: &str) -> Result<String, CommandError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CommandError::PasswordHash)?
        .to_string())
}
