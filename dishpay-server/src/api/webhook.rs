use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use dishpay_core::reconcile::ReconcileError;
use dishpay_sdk::objects::WebhookReceived;

use super::extractors::StripeEvent;
use crate::state::AppState;

/// `POST /webhook` - receive a processor event.
///
/// The extractor has already verified the signature. A completed checkout
/// session marks its order as paid; every other verified event, malformed
/// ones included, is acknowledged without changes. Only a store failure
/// answers non-2xx, so the processor redelivers.
pub(super) async fn stripe_webhook(
    State(state): State<AppState>,
    StripeEvent(event): StripeEvent,
) -> Result<impl IntoResponse, WebhookApiError> {
    tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Webhook event verified");

    let outcome = state.reconciler.apply(&event).await?;
    tracing::debug!(event_id = %event.id, ?outcome, "Webhook event applied");

    Ok(Json(WebhookReceived { received: true }))
}

#[derive(Debug)]
pub(super) struct WebhookApiError(ReconcileError);

impl From<ReconcileError> for WebhookApiError {
    fn from(err: ReconcileError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let ReconcileError::Store(e) = self.0;
        tracing::error!(error = %e, "Failed to apply webhook event");
        (StatusCode::INTERNAL_SERVER_ERROR, "Webhook Error: storage unavailable").into_response()
    }
}
