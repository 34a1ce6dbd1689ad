//! The payment processor seam.
//!
//! [`PaymentGateway`] is the only thing the checkout flow knows about the
//! processor. [`StripeClient`] talks to the real API.

mod stripe;

pub use stripe::StripeClient;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor rejected the request.
    #[error("payment processor error: status {status}: {message}")]
    Api { status: u16, message: String },

    /// The API base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The processor answered 2xx with a body we could not decode.
    #[error("invalid processor response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One priced line on the hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    pub image: Option<String>,
    /// Unit price in minor currency units.
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Everything needed to open a hosted checkout session in payment mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub line_items: Vec<LineItem>,
    pub currency: String,
    pub customer_email: String,
    pub success_url: Url,
    pub cancel_url: Url,
    pub payment_method_types: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

/// The processor's answer to a session request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedSession {
    pub id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CreatedSession, PaymentError>;
}
