//! Stripe API client configuration.

use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct StripeApiConfig {
    /// API root, `https://api.stripe.com` unless pointed at a mock.
    pub api_base: Url,
    /// Secret API key (`sk_...`).
    pub secret_key: String,
    /// Per-request timeout for outgoing API calls.
    pub timeout: Duration,
}
