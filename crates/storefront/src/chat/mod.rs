//! Live support chat plumbing.

mod hub;

pub use hub::{ChatEnvelope, ChatHub};
