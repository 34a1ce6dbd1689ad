//! Runtime configuration types for Dishpay.
//!
//! These are the validated forms of the server's TOML file and environment.
//! Loading and parsing live in the server crate.

mod checkout;
mod server;
mod stripe;
mod webhook;

pub use checkout::CheckoutConfig;
pub use server::ServerConfig;
pub use stripe::StripeApiConfig;
pub use webhook::WebhookConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// The sections that can be reloaded while serving, each behind its own
/// lock.
///
/// [`ServerConfig`] is not here: the listener and CORS layer are built once
/// at startup.
#[derive(Clone)]
pub struct SharedConfig {
    /// Redirect URLs, currency and payment methods for new sessions.
    pub checkout: Arc<RwLock<CheckoutConfig>>,
    /// Webhook signing secret and tolerance.
    pub webhook: Arc<RwLock<WebhookConfig>>,
}

impl SharedConfig {
    pub fn new(checkout: CheckoutConfig, webhook: WebhookConfig) -> Self {
        Self {
            checkout: Arc::new(RwLock::new(checkout)),
            webhook: Arc::new(RwLock::new(webhook)),
        }
    }
}
