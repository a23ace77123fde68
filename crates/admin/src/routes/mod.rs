//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Dashboard
//! GET  /health                  - Health check
//!
//! # Auth
//! GET/POST /auth/login          - Admin login (role-gated)
//! POST /auth/logout             - Logout
//!
//! # Users
//! GET  /users                   - User list (role/username filters)
//! POST /users/{id}/toggle-lock  - Lock/unlock
//! POST /users/{id}/role         - Change role
//!
//! # Products
//! GET  /products                - Product list (incl. inactive)
//! GET/POST /products/new        - Create
//! GET/POST /products/{id}/edit  - Edit
//! POST /products/{id}/delete    - Soft delete
//!
//! # Orders
//! GET  /orders                  - Order list (status filter)
//! GET  /orders/{id}             - Order detail
//! POST /orders/{id}/status      - Set status + notify customer
//!
//! # Reports
//! GET  /statistics              - Monthly revenue, top products, breakdowns
//! GET  /coupons                 - Coupon overview
//!
//! # Support chat
//! GET  /chat                    - Active rooms
//! GET  /chat/{room_id}          - Room console
//! GET  /chat/{room_id}/ws       - Agent websocket
//! ```

pub mod auth;
pub mod chat;
pub mod context;
pub mod coupons;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod statistics;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        // Auth
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Users
        .route("/users", get(users::index))
        .route("/users/{user_id}/toggle-lock", post(users::toggle_lock))
        .route("/users/{user_id}/role", post(users::change_role))
        // Products
        .route("/products", get(products::index))
        .route(
            "/products/new",
            get(products::new_page).post(products::create),
        )
        .route(
            "/products/{product_id}/edit",
            get(products::edit_page).post(products::update),
        )
        .route("/products/{product_id}/delete", post(products::delete))
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/{order_id}", get(orders::show))
        .route("/orders/{order_id}/status", post(orders::update_status))
        // Reports
        .route("/statistics", get(statistics::statistics))
        .route("/coupons", get(coupons::index))
        // Support chat
        .route("/chat", get(chat::index))
        .route("/chat/{room_id}", get(chat::room))
        .route("/chat/{room_id}/ws", get(chat::websocket))
}
