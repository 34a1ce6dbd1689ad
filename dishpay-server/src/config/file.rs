//! TOML file configuration structures.
//!
//! These structs directly map to the `dishpay.toml` file format. Every
//! section has defaults, so an empty file is a valid development config.
//! Secrets are never read from the file.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:7000").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Origins allowed to call the API from a browser. Empty allows any.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 7000))
}

/// Checkout session section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default = "default_success_url")]
    pub success_url: Url,
    #[serde(default = "default_cancel_url")]
    pub cancel_url: Url,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default = "default_payment_method_types")]
    pub payment_method_types: Vec<String>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
            currency: CurrencyConfig::default(),
            payment_method_types: default_payment_method_types(),
        }
    }
}

fn default_success_url() -> Url {
    Url::parse("http://localhost:3000/success").expect("valid default URL")
}

fn default_cancel_url() -> Url {
    Url::parse("http://localhost:3000/cancel").expect("valid default URL")
}

fn default_payment_method_types() -> Vec<String> {
    vec!["card".to_string()]
}

/// Currency charged for every session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_currency_code")]
    pub code: String,
    #[serde(default = "default_minor_unit_exponent")]
    pub minor_unit_exponent: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: default_currency_code(),
            minor_unit_exponent: default_minor_unit_exponent(),
        }
    }
}

fn default_currency_code() -> String {
    "inr".to_string()
}

fn default_minor_unit_exponent() -> u32 {
    2
}

/// Stripe API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    #[serde(default = "default_api_base")]
    pub api_base: Url,
    /// Timeout for each outgoing API request, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum accepted age of a webhook delivery, in seconds.
    #[serde(default = "default_webhook_tolerance_secs")]
    pub webhook_tolerance_secs: i64,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            webhook_tolerance_secs: default_webhook_tolerance_secs(),
        }
    }
}

fn default_api_base() -> Url {
    Url::parse("https://api.stripe.com").expect("valid default URL")
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_webhook_tolerance_secs() -> i64 {
    dishpay_sdk::signature::DEFAULT_TOLERANCE_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"
allowed_origins = ["https://shop.example.com"]

[checkout]
success_url = "https://shop.example.com/success"
cancel_url = "https://shop.example.com/cancel"

[checkout.currency]
code = "usd"

[stripe]
webhook_tolerance_secs = 120
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.server.allowed_origins.len(), 1);
        assert_eq!(
            config.checkout.success_url.as_str(),
            "https://shop.example.com/success"
        );
        assert_eq!(config.checkout.currency.code, "usd");
        assert_eq!(config.checkout.currency.minor_unit_exponent, 2);
        assert_eq!(config.checkout.payment_method_types, vec!["card"]);
        assert_eq!(config.stripe.webhook_tolerance_secs, 120);
        assert_eq!(config.stripe.timeout_secs, 30);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.listen.port(), 7000);
        assert_eq!(
            config.checkout.success_url.as_str(),
            "http://localhost:3000/success"
        );
        assert_eq!(
            config.checkout.cancel_url.as_str(),
            "http://localhost:3000/cancel"
        );
        assert_eq!(config.checkout.currency.code, "inr");
        assert_eq!(config.stripe.api_base.as_str(), "https://api.stripe.com/");
        assert_eq!(config.stripe.webhook_tolerance_secs, 300);
    }

    #[test]
    fn test_example_file_parses() {
        let config: FileConfig =
            toml::from_str(include_str!("../../../dishpay.example.toml")).unwrap();
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.checkout.currency.code, "inr");
    }
}
