//! HTTP API handlers.
//!
//! # Endpoints
//!
//! - `POST /api/create-checkout-session` – open a hosted checkout session
//! - `POST /webhook`                     – processor event callback

use axum::{Router, routing::post};

use crate::state::AppState;

mod checkout;
mod extractors;
mod webhook;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/create-checkout-session",
            post(checkout::create_checkout_session),
        )
        .route("/webhook", post(webhook::stripe_webhook))
}
