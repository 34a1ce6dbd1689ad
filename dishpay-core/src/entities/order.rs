use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: Uuid,
    pub email: String,
    pub items: Json<Vec<OrderItem>>,
    /// Total in minor currency units.
    pub amount: i64,
    pub currency: String,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub stripe_session_id: String,
    pub payment_intent_id: Option<String>,
    pub status: OrderStatus,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

/// Snapshot of one cart line, stored as JSONB alongside the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i64,
    /// Unit price in major currency units, as submitted. Kept as a JSON
    /// number in the snapshot.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: Option<String>,
}

/// `FAILED` is part of the stored enum but nothing transitions into it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE", type_name = "order_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Paid,
    Failed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::Paid => write!(f, "PAID"),
            OrderStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Data for inserting a new pending order.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOrder {
    pub email: String,
    pub items: Vec<OrderItem>,
    pub amount: i64,
    pub currency: String,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub stripe_session_id: String,
}

impl Processor<InsertOrder> for DatabaseProcessor {
    type Output = OrderRecord;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:InsertOrder")]
    async fn process(&self, insert: InsertOrder) -> Result<OrderRecord, sqlx::Error> {
        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            INSERT INTO orders (
                id, email, items, amount, currency,
                customer_name, customer_address, stripe_session_id, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING
                id, email, items, amount, currency,
                customer_name, customer_address, stripe_session_id,
                payment_intent_id, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(insert.email)
        .bind(Json(insert.items))
        .bind(insert.amount)
        .bind(insert.currency)
        .bind(insert.customer_name)
        .bind(insert.customer_address)
        .bind(insert.stripe_session_id)
        .bind(OrderStatus::Pending)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }
}

/// Mark the order created for a checkout session as paid.
///
/// A single `UPDATE`, so concurrent redeliveries cannot interleave a
/// read-modify-write. Returns `None` when no order carries the session id.
#[derive(Debug, Clone)]
pub struct MarkOrderPaid {
    pub stripe_session_id: String,
    pub payment_intent_id: Option<String>,
}

impl Processor<MarkOrderPaid> for DatabaseProcessor {
    type Output = Option<OrderRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkOrderPaid")]
    async fn process(&self, update: MarkOrderPaid) -> Result<Option<OrderRecord>, sqlx::Error> {
        let record = sqlx::query_as::<_, OrderRecord>(
            r#"
            UPDATE orders
            SET status = $2, payment_intent_id = $3, updated_at = now()
            WHERE stripe_session_id = $1
            RETURNING
                id, email, items, amount, currency,
                customer_name, customer_address, stripe_session_id,
                payment_intent_id, status, created_at, updated_at
            "#,
        )
        .bind(update.stripe_session_id)
        .bind(OrderStatus::Paid)
        .bind(update.payment_intent_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}
