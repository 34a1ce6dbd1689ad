pub mod checkout;
pub mod stripe_event;

pub use checkout::{CartProduct, CheckoutSessionCreated, CreateCheckoutSession, ErrorResponse};
pub use stripe_event::{CheckoutSessionObject, Event, EventData, ExpandableId, WebhookReceived};
