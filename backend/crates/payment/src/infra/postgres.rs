//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::order::{OrderStatus, SettlementOrder, SettlementOutcome};
use crate::domain::repository::SettlementRepository;
use crate::error::{PaymentError, PaymentResult};

/// PostgreSQL-backed settlement repository
#[derive(Clone)]
pub struct PgSettlementRepository {
    pool: PgPool,
}

impl PgSettlementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SettlementRepository for PgSettlementRepository {
    async fn find_by_order_no(&self, order_no: &str) -> PaymentResult<Option<SettlementOrder>> {
        let row = sqlx::query_as::<_, SettlementOrderRow>(
            r#"
            SELECT
                order_no,
                account_code,
                phone,
                amount,
                status,
                pay_order_id,
                created_at,
                settled_at
            FROM settlement_orders
            WHERE order_no = $1
            "#,
        )
        .bind(order_no)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_order()).transpose()
    }

    async fn settle(
        &self,
        order_no: &str,
        pay_order_id: Option<&str>,
    ) -> PaymentResult<SettlementOutcome> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-swap on status: only one caller sees the row come back
        let claimed = sqlx::query_as::<_, (i64, String, Decimal)>(
            r#"
            UPDATE settlement_orders
            SET status = $2,
                pay_order_id = COALESCE($3, pay_order_id),
                settled_at = NOW()
            WHERE order_no = $1 AND status = $4
            RETURNING account_code, phone, amount
            "#,
        )
        .bind(order_no)
        .bind(OrderStatus::Settled.id())
        .bind(pay_order_id)
        .bind(OrderStatus::Pending.id())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((account_code, phone, amount)) = claimed else {
            return Ok(SettlementOutcome::AlreadySettled);
        };

        let credited = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + $2,
                total_deposit = total_deposit + $2
            WHERE identity_code = $1
            "#,
        )
        .bind(account_code)
        .bind(amount)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if credited != 1 {
            // Dropping the transaction rolls the status change back
            return Err(PaymentError::Internal(format!(
                "Order {order_no} references missing account {account_code}"
            )));
        }

        tx.commit().await?;

        Ok(SettlementOutcome::Settled { phone, amount })
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct SettlementOrderRow {
    order_no: String,
    account_code: i64,
    phone: String,
    amount: Decimal,
    status: i16,
    pay_order_id: Option<String>,
    created_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
}

impl SettlementOrderRow {
    fn into_order(self) -> PaymentResult<SettlementOrder> {
        let status = OrderStatus::from_id(self.status).ok_or_else(|| {
            PaymentError::Internal(format!("Invalid order status in DB: {}", self.status))
        })?;

        Ok(SettlementOrder {
            order_no: self.order_no,
            account_code: self.account_code,
            phone: self.phone,
            amount: self.amount,
            status,
            pay_order_id: self.pay_order_id,
            created_at: self.created_at,
            settled_at: self.settled_at,
        })
    }
}
