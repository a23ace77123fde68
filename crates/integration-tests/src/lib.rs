//! Integration tests for MobiGear.
//!
//! The tests under `tests/` exercise the pure logic exported by the
//! storefront and admin crates: coupon discount math, order pricing, the
//! bank-transfer QR payload, the assistant's catalog prompt, and the chat
//! wire format both processes must agree on.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mobigear-integration-tests
//! ```
//!
//! Nothing here touches a live database; end-to-end flows against Postgres
//! are exercised manually via the seeded demo data (`mg-cli seed`).
