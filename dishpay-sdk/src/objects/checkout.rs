//! Checkout API request and response types.
//!
//! These are sent by the storefront frontend when the customer presses
//! "pay". Field names follow the storefront's cart shape (`dish`, `qnty`,
//! `imgdata`), which predates this backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/create-checkout-session`.
///
/// Every field is optional at the serde level so that a missing email or
/// cart produces a domain validation error instead of a JSON rejection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSession {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub products: Vec<CartProduct>,
}

/// A single cart line as submitted by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    /// Display name of the dish.
    pub dish: String,
    /// Image URL shown on the hosted checkout page.
    #[serde(default)]
    pub imgdata: Option<String>,
    /// Unit price in major currency units (e.g. rupees, not paise).
    pub price: Decimal,
    /// Quantity ordered.
    pub qnty: i64,
}

/// Response returned after a checkout session is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionCreated {
    /// The payment processor's session id, used by the frontend to redirect.
    pub id: String,
}

/// JSON error body used by every JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
