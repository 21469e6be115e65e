//! Integration tests for Tangelo.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the storefront
//! docker compose up -d db
//! cargo run -p tangelo-storefront
//!
//! # Run integration tests
//! cargo test -p tangelo-integration-tests -- --ignored
//! ```
//!
//! Tests live in `tests/` and talk to a running storefront over HTTP with
//! a cookie-holding reqwest client, so cart state survives across requests
//! the same way it does for a browser.

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
