//! Order submission via the hosted orders API.
//!
//! The storefront never persists orders itself; the draft assembled at
//! checkout is posted to the orders API, which responds with an opaque
//! order reference on success.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use tangelo_core::{OrderRef, UserId};

use crate::config::OrdersApiConfig;

/// Errors from order submission.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// The HTTP request failed (connect, timeout, body decode).
    #[error("orders API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The orders API answered with a non-success status.
    #[error("orders API returned {0}")]
    Status(reqwest::StatusCode),
}

/// One line of an order draft.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// Contact details captured by the checkout form.
#[derive(Debug, Clone, Serialize)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// A complete order draft, ready for submission.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub contact: ContactDetails,
    pub notes: String,
    pub delivery_date: Option<NaiveDate>,
    pub items: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Capability for submitting an order draft.
///
/// Injected into the checkout flow so tests can exercise the success and
/// failure paths without a live orders API.
pub trait OrderGateway {
    /// Submit the draft and return the opaque order reference on success.
    async fn submit(&self, draft: &OrderDraft) -> Result<OrderRef, OrderError>;
}

/// Response body of a successful order creation.
#[derive(Debug, Deserialize)]
struct CreatedOrder {
    id: OrderRef,
}

/// Production [`OrderGateway`] backed by the hosted orders API.
#[derive(Clone)]
pub struct HttpOrderGateway {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl HttpOrderGateway {
    /// Create a new orders API client.
    #[must_use]
    pub fn new(config: &OrdersApiConfig) -> Self {
        let endpoint = format!("{}/orders", config.base_url.trim_end_matches('/'));

        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_token: config.api_token.expose_secret().to_string(),
        }
    }
}

impl OrderGateway for HttpOrderGateway {
    async fn submit(&self, draft: &OrderDraft) -> Result<OrderRef, OrderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(draft)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrderError::Status(status));
        }

        let created: CreatedOrder = response.json().await?;
        tracing::info!(order_ref = %created.id, "order submitted");

        Ok(created.id)
    }
}
