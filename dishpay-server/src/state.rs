//! Application state shared across all request handlers.

use dishpay_core::checkout::CheckoutService;
use dishpay_core::config::SharedConfig;
use dishpay_core::payment::PaymentGateway;
use dishpay_core::reconcile::WebhookReconciler;
use dishpay_core::store::OrderStore;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Creates hosted sessions and pending orders.
    pub checkout: CheckoutService,
    /// Applies verified webhook events to the order store.
    pub reconciler: WebhookReconciler,
}

impl AppState {
    /// Wire the services to the given store and payment gateway.
    pub fn new(
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn PaymentGateway>,
        config: SharedConfig,
    ) -> Self {
        Self {
            config,
            checkout: CheckoutService::new(store.clone(), gateway),
            reconciler: WebhookReconciler::new(store),
        }
    }
}
