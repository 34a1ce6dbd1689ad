//! Configuration module for dishpay-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments,
//! and environment variables (secrets only).

pub mod file;

use dishpay_core::config::{
    CheckoutConfig, ServerConfig, SharedConfig, StripeApiConfig, WebhookConfig,
};
use dishpay_core::money::{Currency, MAX_MINOR_UNIT_EXPONENT};
use file::FileConfig;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the Stripe secret API key.
pub const STRIPE_SECRET_ENV: &str = "STRIPE_SECRET";
/// Environment variable holding the webhook endpoint signing secret.
pub const STRIPE_WEBHOOK_SECRET_ENV: &str = "STRIPE_WEBHOOK_SECRET";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),
}

/// Secrets taken from the environment.
#[derive(Debug, Clone)]
pub struct Secrets {
    pub stripe_secret_key: String,
    pub webhook_secret: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            stripe_secret_key: read_env(STRIPE_SECRET_ENV)?,
            webhook_secret: read_env(STRIPE_WEBHOOK_SECRET_ENV)?,
        })
    }
}

fn read_env(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingEnv(name))
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub checkout: CheckoutConfig,
    pub webhook: WebhookConfig,
    pub stripe: StripeApiConfig,
}

impl LoadedConfig {
    /// The reloadable sections, wrapped for sharing with handlers.
    ///
    /// The server and Stripe API sections are consumed once at startup.
    pub fn shared(&self) -> SharedConfig {
        SharedConfig::new(self.checkout.clone(), self.webhook.clone())
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Read secrets from the environment
    /// 4. Validate and build the runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let secrets = Secrets::from_env()?;
        build_loaded_config(file_config, secrets)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let currency = &config.checkout.currency;
    if currency.code.len() != 3 || !currency.code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::ValidationError(format!(
            "currency code {:?} is not a three-letter ISO code",
            currency.code
        )));
    }
    if currency.minor_unit_exponent > MAX_MINOR_UNIT_EXPONENT {
        return Err(ConfigError::ValidationError(format!(
            "minor_unit_exponent must be at most {MAX_MINOR_UNIT_EXPONENT}"
        )));
    }
    if config.checkout.payment_method_types.is_empty() {
        return Err(ConfigError::ValidationError(
            "at least one payment method type is required".to_string(),
        ));
    }
    if config.stripe.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "stripe.timeout_secs must be positive".to_string(),
        ));
    }
    if config.stripe.webhook_tolerance_secs < 0 {
        return Err(ConfigError::ValidationError(
            "stripe.webhook_tolerance_secs must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// Validate a parsed file and combine it with the secrets.
pub fn build_loaded_config(
    file_config: FileConfig,
    secrets: Secrets,
) -> Result<LoadedConfig, ConfigError> {
    validate(&file_config)?;

    let FileConfig {
        server,
        checkout,
        stripe,
    } = file_config;

    Ok(LoadedConfig {
        server: ServerConfig {
            listen: server.listen,
            allowed_origins: server.allowed_origins,
        },
        checkout: CheckoutConfig {
            success_url: checkout.success_url,
            cancel_url: checkout.cancel_url,
            currency: Currency::new(checkout.currency.code, checkout.currency.minor_unit_exponent),
            payment_method_types: checkout.payment_method_types,
        },
        webhook: WebhookConfig::new(
            secrets.webhook_secret.into_bytes(),
            stripe.webhook_tolerance_secs,
        ),
        stripe: StripeApiConfig {
            api_base: stripe.api_base,
            secret_key: secrets.stripe_secret_key,
            timeout: Duration::from_secs(stripe.timeout_secs),
        },
    })
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    read_env("DATABASE_URL")
}
