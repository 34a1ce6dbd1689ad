//! Webhook reconciliation.
//!
//! Applies verified processor events to the order store. Only
//! `checkout.session.completed` changes state; it moves the matching order
//! to `PAID` and records the payment intent. Redelivery re-sets the same
//! fields, so handling an event twice is harmless.
//!
//! Only a store failure is an error. Anything wrong with a verified event's
//! content is an outcome, since redelivering it cannot fix it.

use std::sync::Arc;

use dishpay_sdk::objects::Event;
use dishpay_sdk::objects::stripe_event::CHECKOUT_SESSION_COMPLETED;
use thiserror::Error;
use uuid::Uuid;

use crate::store::{OrderStore, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened to an accepted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    MarkedPaid { order_id: Uuid, session_id: String },
    /// The session id matched no order. Not an error.
    UnknownSession { session_id: String },
    /// Event types other than session completion are accepted and dropped.
    Ignored { event_type: String },
    /// The event type is known but its `data.object` is not a session.
    MalformedObject { event_type: String, reason: String },
}

#[derive(Clone)]
pub struct WebhookReconciler {
    store: Arc<dyn OrderStore>,
}

impl WebhookReconciler {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn apply(&self, event: &Event) -> Result<ReconcileOutcome, ReconcileError> {
        if event.event_type != CHECKOUT_SESSION_COMPLETED {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Ignoring webhook event");
            return Ok(ReconcileOutcome::Ignored {
                event_type: event.event_type.clone(),
            });
        }

        let session = match event.checkout_session() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    error = %e,
                    "Dropping event with malformed session object"
                );
                return Ok(ReconcileOutcome::MalformedObject {
                    event_type: event.event_type.clone(),
                    reason: e.to_string(),
                });
            }
        };

        match self
            .store
            .mark_paid(&session.id, session.payment_intent_id())
            .await?
        {
            Some(order) => {
                tracing::info!(
                    event_id = %event.id,
                    order_id = %order.id,
                    session_id = %session.id,
                    "Order marked as PAID"
                );
                Ok(ReconcileOutcome::MarkedPaid {
                    order_id: order.id,
                    session_id: session.id,
                })
            }
            None => {
                tracing::warn!(
                    event_id = %event.id,
                    session_id = %session.id,
                    "Completed session matches no order"
                );
                Ok(ReconcileOutcome::UnknownSession {
                    session_id: session.id,
                })
            }
        }
    }
}
