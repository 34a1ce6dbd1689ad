//! Webhook verification configuration.

/// Secret and freshness window for incoming processor webhooks.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint signing secret (`whsec_...`).
    pub secret: Box<[u8]>,
    /// Maximum accepted age of a delivery, in seconds.
    pub tolerance_secs: i64,
}

impl WebhookConfig {
    pub fn new(secret: impl Into<Box<[u8]>>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Get the secret key bytes for HMAC verification.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}
