//! Checkout and buy-now handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use mobigear_core::{PaymentMethodId, Price, ProductId};

use crate::db::RepositoryError;
use crate::db::orders::{NewOrderItem, OrderRepository};
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::filters;
use crate::error::{AppError, Result};
use crate::flash;
use crate::middleware::RequireAuth;
use crate::models::order::PaymentMethod;
use crate::models::session_keys;
use crate::models::{BuyNow, CurrentUser};
use crate::routes::cart::CartView;
use crate::routes::context::PageContext;
use crate::services::cart::{self, CartService};
use crate::services::checkout::{CheckoutService, ShippingDetails};
use crate::state::AppState;

/// Payment method display data.
#[derive(Debug, Clone)]
pub struct PaymentMethodView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl From<&PaymentMethod> for PaymentMethodView {
    fn from(method: &PaymentMethod) -> Self {
        Self {
            id: method.id.as_i32(),
            name: method.name.clone(),
            description: method.description.clone(),
            icon: method.icon.clone(),
        }
    }
}

/// Prefilled shipping form values.
#[derive(Debug, Clone, Default)]
pub struct ShippingFormView {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub latitude: String,
    pub longitude: String,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub form: ShippingFormView,
    pub payment_methods: Vec<PaymentMethodView>,
    pub coupon_code: Option<String>,
    pub discount: Option<String>,
    pub shipping_fee: String,
    pub total: String,
}

/// Buy-now checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/buy_now.html")]
pub struct BuyNowTemplate {
    pub page: PageContext,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
    pub shipping_fee: String,
    pub total: String,
    pub form: ShippingFormView,
    pub payment_methods: Vec<PaymentMethodView>,
}

/// Shipping form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub note: String,
    pub payment_method: i32,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl CheckoutForm {
    fn validate(&self) -> std::result::Result<(), &'static str> {
        if self.full_name.trim().is_empty() {
            return Err("Please enter your full name.");
        }
        if self.phone.trim().is_empty() {
            return Err("Please enter your phone number.");
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err("Please enter a valid email address.");
        }
        if self.address.trim().is_empty() {
            return Err("Please enter your shipping address.");
        }
        Ok(())
    }

    fn details(&self) -> ShippingDetails {
        ShippingDetails {
            full_name: self.full_name.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            email: self.email.trim().to_owned(),
            address: self.address.trim().to_owned(),
            latitude: parse_coord(self.latitude.as_deref()),
            longitude: parse_coord(self.longitude.as_deref()),
            note: self.note.trim().to_owned(),
        }
    }
}

fn parse_coord(value: Option<&str>) -> Option<Decimal> {
    value?.trim().parse::<Decimal>().ok()
}

async fn prefill(state: &AppState, user: &CurrentUser) -> Result<ShippingFormView> {
    let full = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))?;

    Ok(ShippingFormView {
        full_name: full.display_name(),
        phone: full.phone.unwrap_or_default(),
        email: full.email.to_string(),
        address: full.address.unwrap_or_default(),
        latitude: full.latitude.map(|v| v.to_string()).unwrap_or_default(),
        longitude: full.longitude.map(|v| v.to_string()).unwrap_or_default(),
    })
}

/// Display the checkout page.
#[instrument(skip(state, session, user))]
pub async fn checkout_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let service = CartService::new(state.pool());
    let session_cart = cart::load_cart(&session).await;
    let resolved = service.resolve(&session_cart).await?;

    if resolved.is_empty() {
        flash::warning(&session, "Your cart is empty!").await;
        return Ok(Redirect::to("/products").into_response());
    }

    let subtotal = resolved.subtotal();
    let coupon = service.resolve_coupon(&session, subtotal).await?;
    let discount = coupon.as_ref().map_or(Price::ZERO, |(_, d)| *d);

    let shipping_fee = state.config().shipping_fee;
    let total = (subtotal + shipping_fee).saturating_sub(discount);

    let payment_methods = OrderRepository::new(state.pool())
        .list_payment_methods()
        .await?;

    let form = prefill(&state, &user).await?;
    let page = PageContext::build(&state, &session, Some(user)).await;

    Ok(CheckoutTemplate {
        page,
        cart: CartView::from(&resolved),
        form,
        payment_methods: payment_methods.iter().map(PaymentMethodView::from).collect(),
        coupon_code: coupon.as_ref().map(|(c, _)| c.code.clone()),
        discount: coupon.as_ref().map(|(_, d)| d.display()),
        shipping_fee: shipping_fee.display(),
        total: total.display(),
    }
    .into_response())
}

/// Place the order from the cart.
#[instrument(skip(state, session, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    if let Err(message) = form.validate() {
        flash::error(&session, message).await;
        return Ok(Redirect::to("/checkout").into_response());
    }

    let service = CartService::new(state.pool());
    let session_cart = cart::load_cart(&session).await;
    let resolved = service.resolve(&session_cart).await?;

    if resolved.is_empty() {
        flash::warning(&session, "Your cart is empty!").await;
        return Ok(Redirect::to("/products").into_response());
    }

    let orders = OrderRepository::new(state.pool());
    let Some(payment_method) = orders
        .get_payment_method(PaymentMethodId::new(form.payment_method))
        .await?
    else {
        flash::error(&session, "Please choose a payment method.").await;
        return Ok(Redirect::to("/checkout").into_response());
    };

    let subtotal = resolved.subtotal();
    let coupon = service
        .resolve_coupon(&session, subtotal)
        .await?
        .map(|(coupon, _)| coupon);

    let items: Vec<NewOrderItem> = resolved
        .items
        .iter()
        .map(|item| NewOrderItem {
            product_id: item.product.id,
            quantity: item.quantity,
            price: item.unit_price(),
        })
        .collect();

    let result = CheckoutService::new(state.pool())
        .place_order(
            user.id,
            form.details(),
            &payment_method,
            items,
            coupon.as_ref(),
            state.config().shipping_fee,
            state.email(),
        )
        .await;

    match result {
        Ok(order) => {
            cart::clear_cart(&session).await;
            cart::remove_coupon_code(&session).await;
            flash::success(&session, "Order placed successfully!").await;
            Ok(Redirect::to(&format!("/orders/success/{}", order.id)).into_response())
        }
        Err(RepositoryError::Conflict(reason)) => {
            flash::error(&session, format!("Could not place the order: {reason}.")).await;
            Ok(Redirect::to("/cart").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Buy-now form data.
#[derive(Debug, Deserialize)]
pub struct BuyNowForm {
    pub quantity: Option<u32>,
}

/// Stash a single product purchase in the session and go to its checkout.
#[instrument(skip(state, session, form))]
pub async fn buy_now(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
    Path(product_id): Path<i32>,
    Form(form): Form<BuyNowForm>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool())
        .get_active_by_id(ProductId::new(product_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let quantity = form.quantity.unwrap_or(1).max(1);
    if i64::from(quantity) > i64::from(product.stock) {
        flash::error(&session, format!("Only {} left in stock!", product.stock)).await;
        return Ok(Redirect::to(&product.url()).into_response());
    }

    session
        .insert(
            session_keys::BUY_NOW,
            BuyNow {
                product_id: product.id,
                quantity,
            },
        )
        .await?;

    Ok(Redirect::to("/buy-now/checkout").into_response())
}

async fn load_buy_now(session: &Session) -> Option<BuyNow> {
    session
        .get::<BuyNow>(session_keys::BUY_NOW)
        .await
        .ok()
        .flatten()
}

/// Display the single-item checkout.
#[instrument(skip(state, session, user))]
pub async fn buy_now_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    let Some(buy_now) = load_buy_now(&session).await else {
        return Ok(Redirect::to("/products").into_response());
    };

    let Some(product) = ProductRepository::new(state.pool())
        .get_active_by_id(buy_now.product_id)
        .await?
    else {
        return Ok(Redirect::to("/products").into_response());
    };

    let unit_price = product.final_price();
    let subtotal = unit_price * buy_now.quantity;
    let shipping_fee = state.config().shipping_fee;
    let total = subtotal + shipping_fee;

    let payment_methods = OrderRepository::new(state.pool())
        .list_payment_methods()
        .await?;
    let form = prefill(&state, &user).await?;
    let page = PageContext::build(&state, &session, Some(user)).await;

    Ok(BuyNowTemplate {
        page,
        product_name: product.name,
        quantity: buy_now.quantity,
        unit_price: unit_price.display(),
        subtotal: subtotal.display(),
        shipping_fee: shipping_fee.display(),
        total: total.display(),
        form,
        payment_methods: payment_methods.iter().map(PaymentMethodView::from).collect(),
    }
    .into_response())
}

/// Place a buy-now order (no coupon on the fast path).
#[instrument(skip(state, session, user, form))]
pub async fn buy_now_place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let Some(buy_now) = load_buy_now(&session).await else {
        return Ok(Redirect::to("/products").into_response());
    };

    if let Err(message) = form.validate() {
        flash::error(&session, message).await;
        return Ok(Redirect::to("/buy-now/checkout").into_response());
    }

    let Some(product) = ProductRepository::new(state.pool())
        .get_active_by_id(buy_now.product_id)
        .await?
    else {
        return Ok(Redirect::to("/products").into_response());
    };

    let orders = OrderRepository::new(state.pool());
    let Some(payment_method) = orders
        .get_payment_method(PaymentMethodId::new(form.payment_method))
        .await?
    else {
        flash::error(&session, "Please choose a payment method.").await;
        return Ok(Redirect::to("/buy-now/checkout").into_response());
    };

    let items = vec![NewOrderItem {
        product_id: product.id,
        quantity: buy_now.quantity,
        price: product.final_price(),
    }];

    let result = CheckoutService::new(state.pool())
        .place_order(
            user.id,
            form.details(),
            &payment_method,
            items,
            None,
            state.config().shipping_fee,
            state.email(),
        )
        .await;

    match result {
        Ok(order) => {
            if let Err(e) = session.remove::<BuyNow>(session_keys::BUY_NOW).await {
                tracing::warn!("Failed to clear buy-now state: {e}");
            }
            flash::success(&session, "Order placed successfully!").await;
            Ok(Redirect::to(&format!("/orders/success/{}", order.id)).into_response())
        }
        Err(RepositoryError::Conflict(reason)) => {
            flash::error(&session, format!("Could not place the order: {reason}.")).await;
            Ok(Redirect::to(&product.url()).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
