//! The order store seam.
//!
//! Handlers and services depend on [`OrderStore`]; the server injects
//! [`PgOrderStore`], tests inject [`MemoryOrderStore`].

use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use sqlx::types::Json;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::order::{InsertOrder, MarkOrderPaid, OrderRecord, OrderStatus};
use crate::framework::DatabaseProcessor;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("an order already exists for checkout session {0}")]
    DuplicateSession(String),
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order in `PENDING` state.
    async fn insert(&self, order: InsertOrder) -> Result<OrderRecord, StoreError>;

    /// Set the order for `stripe_session_id` to `PAID` and record the
    /// payment intent. `Ok(None)` when no order matches.
    async fn mark_paid(
        &self,
        stripe_session_id: &str,
        payment_intent_id: Option<&str>,
    ) -> Result<Option<OrderRecord>, StoreError>;
}

/// Postgres-backed order store.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    processor: DatabaseProcessor,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            processor: DatabaseProcessor { pool },
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: InsertOrder) -> Result<OrderRecord, StoreError> {
        let session_id = order.stripe_session_id.clone();
        self.processor.process(order).await.map_err(|e| {
            let unique_violation = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if unique_violation {
                StoreError::DuplicateSession(session_id)
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn mark_paid(
        &self,
        stripe_session_id: &str,
        payment_intent_id: Option<&str>,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let record = self
            .processor
            .process(MarkOrderPaid {
                stripe_session_id: stripe_session_id.to_owned(),
                payment_intent_id: payment_intent_id.map(str::to_owned),
            })
            .await?;
        Ok(record)
    }
}

/// In-process order store with the same uniqueness rule as the table.
///
/// Used by tests in place of Postgres.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<OrderRecord>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored order, in insertion order.
    pub async fn snapshot(&self) -> Vec<OrderRecord> {
        self.orders.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    pub async fn find_by_session(&self, stripe_session_id: &str) -> Option<OrderRecord> {
        self.orders
            .read()
            .await
            .iter()
            .find(|o| o.stripe_session_id == stripe_session_id)
            .cloned()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: InsertOrder) -> Result<OrderRecord, StoreError> {
        let mut orders = self.orders.write().await;
        if orders
            .iter()
            .any(|o| o.stripe_session_id == order.stripe_session_id)
        {
            return Err(StoreError::DuplicateSession(order.stripe_session_id));
        }
        let now = time::OffsetDateTime::now_utc();
        let record = OrderRecord {
            id: Uuid::now_v7(),
            email: order.email,
            items: Json(order.items),
            amount: order.amount,
            currency: order.currency,
            customer_name: order.customer_name,
            customer_address: order.customer_address,
            stripe_session_id: order.stripe_session_id,
            payment_intent_id: None,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        orders.push(record.clone());
        Ok(record)
    }

    async fn mark_paid(
        &self,
        stripe_session_id: &str,
        payment_intent_id: Option<&str>,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders
            .iter_mut()
            .find(|o| o.stripe_session_id == stripe_session_id)
        else {
            return Ok(None);
        };
        order.status = OrderStatus::Paid;
        order.payment_intent_id = payment_intent_id.map(str::to_owned);
        order.updated_at = time::OffsetDateTime::now_utc();
        Ok(Some(order.clone()))
    }

}
