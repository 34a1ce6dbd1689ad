use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use dishpay_core::checkout::CheckoutError;
use dishpay_core::payment::PaymentError;
use dishpay_core::store::StoreError;
use dishpay_sdk::objects::{CheckoutSessionCreated, CreateCheckoutSession, ErrorResponse};

use crate::state::AppState;

/// `POST /api/create-checkout-session` - open a hosted checkout session.
///
/// Validates the cart, creates the session with the payment processor,
/// records a `PENDING` order and returns the session id for the frontend
/// to redirect with.
pub(super) async fn create_checkout_session(
    state: State<AppState>,
    payload: Result<Json<CreateCheckoutSession>, JsonRejection>,
) -> Result<impl IntoResponse, CheckoutApiError> {
    let Json(request) = payload.map_err(|e| CheckoutApiError::BadRequest(e.body_text()))?;

    let config = state.config.checkout.read().await.clone();
    let record = state.checkout.create_session(&config, request).await?;

    Ok(Json(CheckoutSessionCreated {
        id: record.stripe_session_id,
    }))
}

/// Errors that can occur in the checkout handler.
#[derive(Debug)]
pub(super) enum CheckoutApiError {
    /// The request body or cart is invalid.
    BadRequest(String),
    /// The payment processor call failed.
    Payment(PaymentError),
    /// The session exists upstream but the order was not recorded.
    Store {
        session_id: String,
        source: StoreError,
    },
}

impl From<CheckoutError> for CheckoutApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Validation(message) => Self::BadRequest(message),
            CheckoutError::Payment(e) => Self::Payment(e),
            CheckoutError::Store { session_id, source } => Self::Store { session_id, source },
        }
    }
}

impl IntoResponse for CheckoutApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            CheckoutApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            CheckoutApiError::Payment(e) => {
                tracing::error!(error = %e, "Checkout session creation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "payment processor error".to_string(),
                )
            }
            CheckoutApiError::Store { session_id, source } => {
                tracing::error!(
                    session_id = %session_id,
                    error = %source,
                    "Checkout session created but order not recorded"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to record order".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
