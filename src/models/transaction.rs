use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Escrow lifecycle. Strictly linear: payment is initiated, funds are held,
/// the seller ships, the buyer confirms receipt. No cancellation or refund
/// edge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    EscrowPending,
    FundsSecured,
    Shipped,
    Completed,
}

impl TransactionStatus {
    /// The single forward step from this state, if any.
    pub fn next(self) -> Option<TransactionStatus> {
        match self {
            TransactionStatus::EscrowPending => Some(TransactionStatus::FundsSecured),
            TransactionStatus::FundsSecured => Some(TransactionStatus::Shipped),
            TransactionStatus::Shipped => Some(TransactionStatus::Completed),
            TransactionStatus::Completed => None,
        }
    }

    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        self.next() == Some(next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::EscrowPending => "escrow_pending",
            TransactionStatus::FundsSecured => "funds_secured",
            TransactionStatus::Shipped => "shipped",
            TransactionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    /// Amount held in escrow, whole ZAR.
    pub amount: i64,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct TransactionInsert {
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Uuid,
    pub amount: i64,
}
