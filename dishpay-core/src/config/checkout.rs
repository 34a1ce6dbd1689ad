//! Checkout session configuration.

use url::Url;

use crate::money::Currency;

/// Parameters applied to every checkout session this deployment creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Where the hosted page sends the customer after paying.
    pub success_url: Url,
    /// Where the hosted page sends the customer after backing out.
    pub cancel_url: Url,
    pub currency: Currency,
    pub payment_method_types: Vec<String>,
}
