//! Domain models for the storefront.
//!
//! Database rows are mapped into these types by the repositories in
//! [`crate::db`]; the pure business rules (coupon discounts, derived product
//! pricing, cart arithmetic) live here so they can be tested without I/O.

pub mod cart;
pub mod chat;
pub mod coupon;
pub mod notification;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{Cart, CartLine};
pub use chat::{ChatMessage, ChatRoom, IncomingChatMessage, OutgoingChatMessage};
pub use coupon::Coupon;
pub use notification::Notification;
pub use order::{Order, OrderItem, PaymentMethod, order_total};
pub use product::{Category, Product, ProductImage, Review, average_rating};
pub use session::{BuyNow, CurrentUser, session_keys};
pub use user::{PasswordResetToken, User};
