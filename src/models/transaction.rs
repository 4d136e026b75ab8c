// models/transaction.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::PaymentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Initiated,
    Complete,
    Expired,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Initiated => "initiated",
            TransactionStatus::Complete => "complete",
            TransactionStatus::Expired => "expired",
            TransactionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTransaction {
    pub id: String,
    pub session_id: String,
    pub order_id: String,
    pub amount: f64,
    pub currency: String,

    // Status tracking
    pub status: TransactionStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn new(
        session_id: String,
        order_id: String,
        amount: f64,
        currency: String,
        metadata: HashMap<String, String>,
    ) -> Self {
        let now = Utc::now();
        PaymentTransaction {
            id: Uuid::new_v4().to_string(),
            session_id,
            order_id,
            amount,
            currency,
            status: TransactionStatus::Initiated,
            payment_status: PaymentStatus::Pending,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}
