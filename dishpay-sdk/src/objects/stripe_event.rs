//! Stripe webhook event envelope.
//!
//! Only the fields the reconciler reads are modelled; `data.object` stays
//! as raw JSON until the event type is known.

use serde::{Deserialize, Serialize};

/// Event type emitted when a hosted checkout session finishes successfully.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// A Stripe event as delivered to the webhook endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl Event {
    /// Decode `data.object` as a checkout session.
    pub fn checkout_session(&self) -> Result<CheckoutSessionObject, serde_json::Error> {
        CheckoutSessionObject::deserialize(&self.data.object)
    }
}

/// The subset of a Checkout Session object carried in session events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    /// `null` until a payment exists; an id string unless the event was
    /// configured to expand it.
    #[serde(default)]
    pub payment_intent: Option<ExpandableId>,
}

impl CheckoutSessionObject {
    pub fn payment_intent_id(&self) -> Option<&str> {
        self.payment_intent.as_ref().map(ExpandableId::id)
    }
}

/// A Stripe reference that is either a bare id or an expanded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpandableId {
    Id(String),
    Object { id: String },
}

impl ExpandableId {
    pub fn id(&self) -> &str {
        match self {
            ExpandableId::Id(id) => id,
            ExpandableId::Object { id } => id,
        }
    }
}

/// Acknowledgement body returned to Stripe once an event is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookReceived {
    pub received: bool,
}
