//! Checkout session initiation.
//!
//! Prices the cart, opens a hosted session with the payment processor and
//! records a `PENDING` order keyed by the returned session id.
//!
//! The processor call and the insert are not atomic. If the insert fails
//! the session already exists upstream and is left to expire.

use std::collections::BTreeMap;
use std::sync::Arc;

use dishpay_sdk::objects::{CartProduct, CreateCheckoutSession};
use thiserror::Error;

use crate::config::CheckoutConfig;
use crate::entities::order::{InsertOrder, OrderItem, OrderRecord};
use crate::money::{AmountError, Currency, line_total};
use crate::payment::{LineItem, PaymentError, PaymentGateway, SessionRequest};
use crate::store::{OrderStore, StoreError};

#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request cannot be turned into a session. The message is safe to
    /// show to the customer.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The session was created but the order could not be recorded.
    #[error("failed to record order for session {session_id}: {source}")]
    Store {
        session_id: String,
        #[source]
        source: StoreError,
    },
}

/// A validated cart, priced in minor units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub line_items: Vec<LineItem>,
    pub items: Vec<OrderItem>,
    /// Σ unit_amount × quantity, in minor units.
    pub amount: i64,
}

/// Validate the cart and convert every price to minor units.
pub fn price_cart(products: &[CartProduct], currency: &Currency) -> Result<PricedCart, CheckoutError> {
    if products.is_empty() {
        return Err(CheckoutError::Validation(
            "At least one product is required".to_string(),
        ));
    }

    let mut line_items = Vec::with_capacity(products.len());
    let mut items = Vec::with_capacity(products.len());
    let mut amount: i64 = 0;

    for product in products {
        let unit_amount = currency.to_minor_units(product.price).map_err(|_| {
            CheckoutError::Validation(format!("Price for {} is not a valid amount", product.dish))
        })?;
        let total = line_total(unit_amount, product.qnty).map_err(|e| match e {
            AmountError::InvalidQuantity => CheckoutError::Validation(format!(
                "Quantity for {} must be a positive integer",
                product.dish
            )),
            _ => CheckoutError::Validation("Order total is too large".to_string()),
        })?;
        amount = amount
            .checked_add(total)
            .ok_or_else(|| CheckoutError::Validation("Order total is too large".to_string()))?;

        line_items.push(LineItem {
            name: product.dish.clone(),
            image: product.imgdata.clone(),
            unit_amount,
            quantity: product.qnty,
        });
        items.push(OrderItem {
            name: product.dish.clone(),
            quantity: product.qnty,
            price: product.price,
            image: product.imgdata.clone(),
        });
    }

    Ok(PricedCart {
        line_items,
        items,
        amount,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Creates checkout sessions against an injected gateway and store.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn OrderStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    /// Open a hosted session for `request` and record it as a pending order.
    ///
    /// Nothing is sent to the processor unless the request validates.
    pub async fn create_session(
        &self,
        config: &CheckoutConfig,
        request: CreateCheckoutSession,
    ) -> Result<OrderRecord, CheckoutError> {
        let email = non_blank(request.email)
            .ok_or_else(|| CheckoutError::Validation("Email is required".to_string()))?;
        let customer_name = non_blank(request.customer_name);
        let customer_address = non_blank(request.customer_address);

        let cart = price_cart(&request.products, &config.currency)?;

        let mut metadata = BTreeMap::new();
        if let Some(name) = &customer_name {
            metadata.insert("customer_name".to_string(), name.clone());
        }
        if let Some(address) = &customer_address {
            metadata.insert("customer_address".to_string(), address.clone());
        }

        let session = self
            .gateway
            .create_checkout_session(&SessionRequest {
                line_items: cart.line_items,
                currency: config.currency.code.clone(),
                customer_email: email.clone(),
                success_url: config.success_url.clone(),
                cancel_url: config.cancel_url.clone(),
                payment_method_types: config.payment_method_types.clone(),
                metadata,
            })
            .await?;

        tracing::debug!(session_id = %session.id, amount = cart.amount, "Checkout session created");

        let record = self
            .store
            .insert(InsertOrder {
                email,
                items: cart.items,
                amount: cart.amount,
                currency: config.currency.code.clone(),
                customer_name,
                customer_address,
                stripe_session_id: session.id.clone(),
            })
            .await
            .map_err(|source| CheckoutError::Store {
                session_id: session.id.clone(),
                source,
            })?;

        tracing::info!(
            order_id = %record.id,
            session_id = %record.stripe_session_id,
            amount = record.amount,
            "Pending order recorded"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::order::OrderStatus;
    use crate::payment::CreatedSession;
    use crate::store::{MemoryOrderStore, StoreError};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;
    use url::Url;

    #[derive(Default)]
    struct RecordingGateway {
        calls: AtomicUsize,
        last: Mutex<Option<SessionRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_checkout_session(
            &self,
            request: &SessionRequest,
        ) -> Result<CreatedSession, PaymentError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().await = Some(request.clone());
            if self.fail {
                return Err(PaymentError::Api {
                    status: 400,
                    message: "Invalid API Key provided".to_string(),
                });
            }
            Ok(CreatedSession {
                id: format!("cs_test_{n}"),
            })
        }
    }

    fn config() -> CheckoutConfig {
        CheckoutConfig {
            success_url: Url::parse("http://localhost:3000/success").unwrap(),
            cancel_url: Url::parse("http://localhost:3000/cancel").unwrap(),
            currency: Currency::inr(),
            payment_method_types: vec!["card".to_string()],
        }
    }

    fn product(dish: &str, price: Decimal, qnty: i64) -> CartProduct {
        CartProduct {
            dish: dish.to_string(),
            imgdata: Some("x".to_string()),
            price,
            qnty,
        }
    }

    fn pizza_request() -> CreateCheckoutSession {
        CreateCheckoutSession {
            email: Some("a@b.com".to_string()),
            customer_name: Some("Asha".to_string()),
            customer_address: None,
            products: vec![product("Pizza", Decimal::from(10), 2)],
        }
    }

    #[test]
    fn test_price_cart_sums_minor_units() {
        let cart = price_cart(
            &[
                product("Pizza", Decimal::from(10), 2),
                product("Lassi", Decimal::new(250, 2), 3),
            ],
            &Currency::inr(),
        )
        .unwrap();
        assert_eq!(cart.amount, 10 * 100 * 2 + 250 * 3);
        assert_eq!(cart.line_items[1].unit_amount, 250);
        assert_eq!(cart.items[1].price, Decimal::new(250, 2));
    }

    #[test]
    fn test_price_cart_rejects_bad_lines() {
        let inr = Currency::inr();
        let err = price_cart(&[], &inr).unwrap_err();
        assert_eq!(err.to_string(), "At least one product is required");

        let err = price_cart(&[product("Pizza", Decimal::from(10), 0)], &inr).unwrap_err();
        assert_eq!(err.to_string(), "Quantity for Pizza must be a positive integer");

        let err = price_cart(&[product("Pizza", Decimal::new(-5, 0), 1)], &inr).unwrap_err();
        assert_eq!(err.to_string(), "Price for Pizza is not a valid amount");

        let err = price_cart(&[product("Pizza", Decimal::new(1001, 3), 1)], &inr).unwrap_err();
        assert_eq!(err.to_string(), "Price for Pizza is not a valid amount");

        let err = price_cart(
            &[
                product("Gold", Decimal::from(i64::MAX / 200), 1),
                product("Gold", Decimal::from(i64::MAX / 200), 1),
                product("Gold", Decimal::from(i64::MAX / 200), 1),
            ],
            &inr,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Order total is too large");
    }

    #[tokio::test]
    async fn test_create_session_records_pending_order() {
        let store = Arc::new(MemoryOrderStore::new());
        let gateway = Arc::new(RecordingGateway::default());
        let service = CheckoutService::new(store.clone(), gateway.clone());

        let record = service.create_session(&config(), pizza_request()).await.unwrap();
        assert_eq!(record.stripe_session_id, "cs_test_0");
        assert_eq!(record.amount, 2000);
        assert_eq!(record.currency, "inr");
        assert_eq!(record.status, OrderStatus::Pending);
        assert_eq!(record.customer_name.as_deref(), Some("Asha"));

        let orders = store.snapshot().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].stripe_session_id, "cs_test_0");

        let sent = gateway.last.lock().await.clone().unwrap();
        assert_eq!(sent.customer_email, "a@b.com");
        assert_eq!(sent.currency, "inr");
        assert_eq!(sent.line_items[0].unit_amount, 1000);
        assert_eq!(sent.metadata.get("customer_name").map(String::as_str), Some("Asha"));
        assert!(!sent.metadata.contains_key("customer_address"));
    }

    #[tokio::test]
    async fn test_missing_email_skips_processor_and_store() {
        let store = Arc::new(MemoryOrderStore::new());
        let gateway = Arc::new(RecordingGateway::default());
        let service = CheckoutService::new(store.clone(), gateway.clone());

        for email in [None, Some("   ".to_string())] {
            let mut request = pizza_request();
            request.email = email;
            let err = service.create_session(&config(), request).await.unwrap_err();
            assert!(matches!(err, CheckoutError::Validation(ref m) if m == "Email is required"));
        }
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_processor_failure_persists_nothing() {
        let store = Arc::new(MemoryOrderStore::new());
        let gateway = Arc::new(RecordingGateway {
            fail: true,
            ..Default::default()
        });
        let service = CheckoutService::new(store.clone(), gateway);

        let err = service.create_session(&config(), pizza_request()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Payment(PaymentError::Api { status: 400, .. })));
        assert!(store.is_empty().await);
    }

    struct UnavailableStore;

    #[async_trait]
    impl OrderStore for UnavailableStore {
        async fn insert(&self, _order: InsertOrder) -> Result<OrderRecord, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn mark_paid(
            &self,
            _stripe_session_id: &str,
            _payment_intent_id: Option<&str>,
        ) -> Result<Option<OrderRecord>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    #[tokio::test]
    async fn test_store_failure_reports_orphaned_session() {
        let gateway = Arc::new(RecordingGateway::default());
        let service = CheckoutService::new(Arc::new(UnavailableStore), gateway.clone());

        let err = service.create_session(&config(), pizza_request()).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Store { ref session_id, source: StoreError::Database(_) }
                if session_id == "cs_test_0"
        ));
        assert!(err.to_string().contains("cs_test_0"));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }
}
