use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::transactions::{
    billing::BillingWindow,
    repo_types::{TransactionRow, TransactionType},
};

/// Body of create and update; update replaces every field.
#[derive(Debug, Deserialize)]
pub struct TransactionInput {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    pub user_id: Option<String>,
    pub category_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRef {
    pub id: i64,
    pub name: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub name: String,
}

/// A transaction as returned to clients, with its owner and category.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetails {
    pub id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub user: UserRef,
    pub category: CategoryRef,
}

impl From<TransactionRow> for TransactionDetails {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            amount: row.amount,
            kind: row.kind,
            category_id: row.category_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            user: UserRef {
                id: row.user_id,
                name: row.user_name,
                username: row.user_username,
            },
            category: CategoryRef {
                id: row.category_id,
                name: row.category_name,
            },
        }
    }
}

/// The caller's totals over a billing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Balance {
    pub user_id: i64,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub net: Decimal,
    #[serde(flatten)]
    pub window: BillingWindow,
}
