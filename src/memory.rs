//! In-memory `Store` used by unit and router tests. Mirrors the Postgres
//! constraints the services rely on: unique usernames, case-insensitive
//! unique category names, cascade on user delete, restrict on category delete.

use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    auth::password::hash_password,
    categories::{repo::CategoryRepo, repo_types::Category},
    error::{AppError, AppResult},
    pagination::Pagination,
    transactions::{
        repo::TransactionRepo,
        repo_types::{
            Transaction, TransactionDraft, TransactionFilter, TransactionRow, TransactionType,
        },
    },
    users::{
        repo::UserRepo,
        repo_types::{NewUser, Role, User, UserChanges},
    },
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn row(&self, t: &Transaction) -> TransactionRow {
        let user = self.users.iter().find(|u| u.id == t.user_id);
        let category = self.categories.iter().find(|c| c.id == t.category_id);
        TransactionRow {
            id: t.id,
            user_id: t.user_id,
            amount: t.amount,
            kind: t.kind,
            category_id: t.category_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
            user_name: user.map(|u| u.name.clone()).unwrap_or_default(),
            user_username: user.map(|u| u.username.clone()).unwrap_or_default(),
            category_name: category.map(|c| c.name.clone()).unwrap_or_default(),
        }
    }

    /// Matching rows, newest first.
    fn filtered(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        let mut rows: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| filter.matches(t))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|u| u.username == username && Some(u.id) != except)
    }

    fn category_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.categories
            .iter()
            .any(|c| c.name.to_lowercase() == name.to_lowercase() && Some(c.id) != except)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut tables)
    }

    pub fn seed_user(&self, name: &str, username: &str, password: &str, role: Role) -> User {
        let password_hash = hash_password(password).expect("hash");
        self.with(|t| {
            let now = OffsetDateTime::now_utc();
            let user = User {
                id: t.next_id(),
                name: name.into(),
                username: username.into(),
                password_hash,
                role,
                created_at: now,
                updated_at: now,
            };
            t.users.push(user.clone());
            user
        })
    }

    pub fn seed_category(&self, name: &str) -> Category {
        self.with(|t| {
            let now = OffsetDateTime::now_utc();
            let category = Category {
                id: t.next_id(),
                name: name.into(),
                created_at: now,
                updated_at: now,
            };
            t.categories.push(category.clone());
            category
        })
    }

    pub fn seed_transaction(
        &self,
        user_id: i64,
        amount: Decimal,
        kind: TransactionType,
        category_id: i64,
        created_at: Option<OffsetDateTime>,
    ) -> Transaction {
        self.with(|t| {
            let at = created_at.unwrap_or_else(OffsetDateTime::now_utc);
            let tx = Transaction {
                id: t.next_id(),
                user_id,
                amount,
                kind,
                category_id,
                created_at: at,
                updated_at: at,
            };
            t.transactions.push(tx.clone());
            tx
        })
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.with(|t| t.users.iter().find(|u| u.id == id).cloned()))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.with(|t| t.users.iter().find(|u| u.username == username).cloned()))
    }

    async fn count_users(&self) -> AppResult<i64> {
        Ok(self.with(|t| t.users.len() as i64))
    }

    async fn list_users(&self, page: &Pagination) -> AppResult<Vec<User>> {
        Ok(self.with(|t| page.apply(&t.users)))
    }

    async fn create_user(&self, new: &NewUser) -> AppResult<User> {
        self.with(|t| {
            if t.username_taken(&new.username, None) {
                return Err(AppError::Conflict("duplicate value".into()));
            }
            let now = OffsetDateTime::now_utc();
            let user = User {
                id: t.next_id(),
                name: new.name.clone(),
                username: new.username.clone(),
                password_hash: new.password_hash.clone(),
                role: new.role,
                created_at: now,
                updated_at: now,
            };
            t.users.push(user.clone());
            Ok(user)
        })
    }

    async fn update_user(&self, id: i64, changes: &UserChanges) -> AppResult<Option<User>> {
        self.with(|t| {
            if t.username_taken(&changes.username, Some(id)) {
                return Err(AppError::Conflict("duplicate value".into()));
            }
            let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            user.name = changes.name.clone();
            user.username = changes.username.clone();
            if let Some(hash) = &changes.password_hash {
                user.password_hash = hash.clone();
            }
            user.role = changes.role;
            user.updated_at = OffsetDateTime::now_utc();
            Ok(Some(user.clone()))
        })
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        Ok(self.with(|t| {
            let before = t.users.len();
            t.users.retain(|u| u.id != id);
            t.transactions.retain(|tx| tx.user_id != id);
            t.users.len() != before
        }))
    }
}

#[async_trait]
impl CategoryRepo for MemoryStore {
    async fn find_category(&self, id: i64) -> AppResult<Option<Category>> {
        Ok(self.with(|t| t.categories.iter().find(|c| c.id == id).cloned()))
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let name = name.to_lowercase();
        Ok(self.with(|t| {
            t.categories
                .iter()
                .find(|c| c.name.to_lowercase() == name)
                .cloned()
        }))
    }

    async fn count_categories(&self, search: Option<&str>) -> AppResult<i64> {
        let rows = self.list_categories(search, &Pagination::default()).await?;
        Ok(rows.len() as i64)
    }

    async fn list_categories(
        &self,
        search: Option<&str>,
        page: &Pagination,
    ) -> AppResult<Vec<Category>> {
        let needle = search.map(str::to_lowercase);
        Ok(self.with(|t| {
            let mut rows: Vec<Category> = t
                .categories
                .iter()
                .filter(|c| {
                    needle
                        .as_deref()
                        .map_or(true, |n| c.name.to_lowercase().contains(n))
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            page.apply(&rows)
        }))
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        if self.with(|t| t.category_taken(name, None)) {
            return Err(AppError::Conflict("duplicate value".into()));
        }
        Ok(self.seed_category(name))
    }

    async fn update_category(&self, id: i64, name: &str) -> AppResult<Option<Category>> {
        self.with(|t| {
            if t.category_taken(name, Some(id)) {
                return Err(AppError::Conflict("duplicate value".into()));
            }
            let Some(category) = t.categories.iter_mut().find(|c| c.id == id) else {
                return Ok(None);
            };
            category.name = name.into();
            category.updated_at = OffsetDateTime::now_utc();
            Ok(Some(category.clone()))
        })
    }

    async fn delete_category(&self, id: i64) -> AppResult<bool> {
        self.with(|t| {
            if t.transactions.iter().any(|tx| tx.category_id == id) {
                return Err(AppError::Conflict("referenced row".into()));
            }
            let before = t.categories.len();
            t.categories.retain(|c| c.id != id);
            Ok(t.categories.len() != before)
        })
    }
}

#[async_trait]
impl TransactionRepo for MemoryStore {
    async fn find_transaction(&self, id: i64) -> AppResult<Option<Transaction>> {
        Ok(self.with(|t| t.transactions.iter().find(|tx| tx.id == id).cloned()))
    }

    async fn find_transaction_details(&self, id: i64) -> AppResult<Option<TransactionRow>> {
        Ok(self.with(|t| {
            t.transactions
                .iter()
                .find(|tx| tx.id == id)
                .map(|tx| t.row(tx))
        }))
    }

    async fn count_transactions(&self, filter: &TransactionFilter) -> AppResult<i64> {
        Ok(self.with(|t| t.filtered(filter).len() as i64))
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &Pagination,
    ) -> AppResult<Vec<TransactionRow>> {
        Ok(self.with(|t| {
            let rows: Vec<TransactionRow> =
                t.filtered(filter).into_iter().map(|tx| t.row(tx)).collect();
            page.apply(&rows)
        }))
    }

    async fn sum_transactions(&self, filter: &TransactionFilter) -> AppResult<Decimal> {
        Ok(self.with(|t| t.filtered(filter).iter().map(|tx| tx.amount).sum()))
    }

    async fn create_transaction(
        &self,
        user_id: i64,
        draft: &TransactionDraft,
    ) -> AppResult<Transaction> {
        Ok(self.seed_transaction(user_id, draft.amount, draft.kind, draft.category_id, None))
    }

    async fn update_transaction(&self, id: i64, draft: &TransactionDraft) -> AppResult<bool> {
        Ok(self.with(|t| {
            let Some(tx) = t.transactions.iter_mut().find(|tx| tx.id == id) else {
                return false;
            };
            tx.amount = draft.amount;
            tx.kind = draft.kind;
            tx.category_id = draft.category_id;
            tx.updated_at = OffsetDateTime::now_utc();
            true
        }))
    }

    async fn delete_transaction(&self, id: i64) -> AppResult<bool> {
        Ok(self.with(|t| {
            let before = t.transactions.len();
            t.transactions.retain(|tx| tx.id != id);
            t.transactions.len() != before
        }))
    }
}
