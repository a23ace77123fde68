//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Catalog
//! GET  /products                - Product listing (search/filter/sort/page)
//! GET  /products/{slug}         - Product detail
//! POST /reviews/add/{id}        - Add a review (auth)
//! GET  /category/{slug}         - Products by category
//! GET  /api/search              - Autocomplete (JSON)
//!
//! # Cart
//! GET  /cart                    - Cart page
//! POST /cart/add/{id}           - Add item (flash redirect or AJAX JSON)
//! POST /cart/remove/{id}        - Remove item
//! POST /cart/coupon/apply       - Apply coupon code
//! POST /cart/coupon/remove      - Remove coupon code
//!
//! # Checkout & orders (auth)
//! GET  /checkout                - Checkout page
//! POST /checkout                - Place order
//! POST /buy-now/{id}            - Start single-item checkout
//! GET  /buy-now/checkout        - Single-item checkout page
//! POST /buy-now/checkout        - Place single-item order
//! GET  /orders/history          - Order history
//! GET  /orders/{id}             - Order detail
//! GET  /orders/success/{id}     - Confirmation page
//! POST /orders/{id}/cancel      - Cancel (pending/approved only)
//!
//! # Accounts
//! GET/POST /auth/register       - Registration
//! GET/POST /auth/login          - Login
//! POST /auth/logout             - Logout
//! GET/POST /auth/forgot-password
//! GET/POST /auth/reset-password/{token}
//! GET/POST /account             - Profile
//! POST /account/location        - Update delivery coordinates (JSON)
//! POST /account/brightness      - Update theme brightness (JSON)
//!
//! # Notifications (auth)
//! GET  /notifications           - Feed page
//! POST /notifications/{id}/read - Mark one read (JSON)
//! POST /notifications/read-all  - Mark all read (JSON)
//! GET  /notifications/count     - Unread badge (JSON)
//!
//! # Chat & assistant (auth)
//! GET  /chat                    - Support chat page
//! GET  /chat/ws                 - Chat websocket
//! GET  /assistant               - Assistant page
//! POST /assistant/recommend     - Ask the assistant (JSON)
//! ```

pub mod account;
pub mod assistant;
pub mod auth;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod context;
pub mod home;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router (rate limited).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password/{token}",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{product_id}", post(cart::add))
        .route("/remove/{product_id}", post(cart::remove))
        .route("/coupon/apply", post(cart::apply_coupon))
        .route("/coupon/remove", post(cart::remove_coupon))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(orders::history))
        .route("/success/{order_id}", get(orders::success))
        .route("/{order_id}", get(orders::detail))
        .route("/{order_id}/cancel", post(orders::cancel))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/count", get(notifications::unread_count))
        .route("/read-all", post(notifications::mark_all_read))
        .route("/{notification_id}/read", post(notifications::mark_read))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/reviews/add/{product_id}", post(products::add_review))
        .route("/category/{slug}", get(products::by_category))
        .route("/api/search", get(search::autocomplete))
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .route(
            "/checkout",
            get(checkout::checkout_page).post(checkout::place_order),
        )
        .route("/buy-now/{product_id}", post(checkout::buy_now))
        .route(
            "/buy-now/checkout",
            get(checkout::buy_now_page).post(checkout::buy_now_place_order),
        )
        // Orders
        .nest("/orders", order_routes())
        // Accounts
        .nest("/auth", auth_routes())
        .route(
            "/account",
            get(account::profile_page).post(account::update_profile),
        )
        .route("/account/location", post(account::update_location))
        .route("/account/brightness", post(account::update_brightness))
        // Notifications
        .nest("/notifications", notification_routes())
        // Support chat
        .route("/chat", get(chat::room))
        .route("/chat/ws", get(chat::websocket))
        // AI assistant
        .route("/assistant", get(assistant::chat_page))
        .route("/assistant/recommend", post(assistant::recommend))
}
