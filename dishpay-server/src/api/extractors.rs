//! Custom Axum extractors for request authentication.
//!
//! Provides `StripeEvent`, which verifies the `Stripe-Signature` header
//! against the raw request body and yields the decoded event. The body must
//! not pass through a JSON extractor first; the signature covers the exact
//! bytes sent.
//!
//! All cryptographic operations are delegated to [`dishpay_sdk::signature`].

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dishpay_sdk::objects::Event;
use dishpay_sdk::signature::{self, STRIPE_SIGNATURE_HEADER, SignatureError};

use crate::state::AppState;

/// Largest webhook body accepted.
const MAX_WEBHOOK_BODY: usize = 1024 * 1024;

/// A processor event whose signature has been verified.
pub struct StripeEvent(pub Event);

/// Errors that can occur during webhook verification.
///
/// Every variant fails closed with a 400 and a plain-text message.
#[derive(Debug, thiserror::Error)]
pub enum StripeEventError {
    #[error("missing Stripe-Signature header")]
    MissingHeader,
    #[error("invalid Stripe-Signature header encoding")]
    InvalidHeader,
    #[error("failed to read request body")]
    BodyReadError,
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

impl IntoResponse for StripeEventError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "Rejected webhook delivery");
        (StatusCode::BAD_REQUEST, format!("Webhook Error: {self}")).into_response()
    }
}

impl FromRequest<AppState> for StripeEvent {
    type Rejection = StripeEventError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = req
            .headers()
            .get(STRIPE_SIGNATURE_HEADER)
            .ok_or(StripeEventError::MissingHeader)?
            .to_str()
            .map_err(|_| StripeEventError::InvalidHeader)?
            .to_owned();

        let body_bytes = axum::body::to_bytes(req.into_body(), MAX_WEBHOOK_BODY)
            .await
            .map_err(|_| StripeEventError::BodyReadError)?;

        let webhook = state.config.webhook.read().await;
        let event = signature::construct_event(
            &body_bytes,
            &header_value,
            webhook.secret_bytes(),
            webhook.tolerance_secs,
        )?;
        drop(webhook);

        Ok(StripeEvent(event))
    }
}
