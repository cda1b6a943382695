use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

use crate::transactions::billing::BillingWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

#[derive(Debug, Error)]
#[error("unknown transaction type `{0}`")]
pub struct UnknownTransactionType(pub String);

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

impl TryFrom<String> for TransactionType {
    type Error = UnknownTransactionType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Bare transaction record, as used by the ownership policy.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64, // owner, never changes
    pub amount: Decimal,
    #[serde(rename = "type")]
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: TransactionType,
    pub category_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated values for a create or a full update.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub amount: Decimal,
    pub kind: TransactionType,
    pub category_id: i64,
}

/// Joined row: a transaction with its owner and category names.
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    #[sqlx(rename = "type", try_from = "String")]
    pub kind: TransactionType,
    pub category_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub user_name: String,
    pub user_username: String,
    pub category_name: String,
}

/// Conjunctive predicate shared by count, list and sum so that all three
/// always see the same set of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    /// Exact match against the stored type.
    pub kind: Option<String>,
    pub window: Option<BillingWindow>,
}

impl TransactionFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        self.user_id.map_or(true, |id| t.user_id == id)
            && self.category_id.map_or(true, |id| t.category_id == id)
            && self.kind.as_deref().map_or(true, |k| t.kind.as_str() == k)
            && self.window.map_or(true, |w| w.contains(t.created_at))
    }
}
