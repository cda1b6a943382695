use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    db::PgStore,
    error::AppResult,
    pagination::Pagination,
    transactions::repo_types::{Transaction, TransactionDraft, TransactionFilter, TransactionRow},
};

#[async_trait]
pub trait TransactionRepo: Send + Sync {
    async fn find_transaction(&self, id: i64) -> AppResult<Option<Transaction>>;
    /// Same record joined with its owner and category.
    async fn find_transaction_details(&self, id: i64) -> AppResult<Option<TransactionRow>>;
    async fn count_transactions(&self, filter: &TransactionFilter) -> AppResult<i64>;
    /// Newest first: `created_at DESC, id DESC`.
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &Pagination,
    ) -> AppResult<Vec<TransactionRow>>;
    /// Sum of `amount` over the filtered rows; zero when nothing matches.
    async fn sum_transactions(&self, filter: &TransactionFilter) -> AppResult<Decimal>;
    async fn create_transaction(&self, user_id: i64, draft: &TransactionDraft)
        -> AppResult<Transaction>;
    async fn update_transaction(&self, id: i64, draft: &TransactionDraft) -> AppResult<bool>;
    async fn delete_transaction(&self, id: i64) -> AppResult<bool>;
}

const DETAIL_SELECT: &str = r#"
    SELECT t.id, t.user_id, t.amount, t.type, t.category_id, t.created_at, t.updated_at,
           u.name AS user_name, u.username AS user_username, c.name AS category_name
      FROM transactions t
      JOIN users u ON u.id = t.user_id
      JOIN categories c ON c.id = t.category_id
"#;

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    qb.push(" WHERE TRUE");
    if let Some(user_id) = filter.user_id {
        qb.push(" AND t.user_id = ").push_bind(user_id);
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND t.category_id = ").push_bind(category_id);
    }
    if let Some(kind) = &filter.kind {
        qb.push(" AND t.type = ").push_bind(kind.clone());
    }
    if let Some(window) = filter.window {
        qb.push(" AND t.created_at >= ")
            .push_bind(window.starts_at())
            .push(" AND t.created_at <= ")
            .push_bind(window.ends_at());
    }
}

#[async_trait]
impl TransactionRepo for PgStore {
    async fn find_transaction(&self, id: i64) -> AppResult<Option<Transaction>> {
        let tx = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, user_id, amount, type, category_id, created_at, updated_at
              FROM transactions
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tx)
    }

    async fn find_transaction_details(&self, id: i64) -> AppResult<Option<TransactionRow>> {
        let mut qb = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        qb.push(" WHERE t.id = ").push_bind(id);
        let row = qb
            .build_query_as::<TransactionRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn count_transactions(&self, filter: &TransactionFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions t");
        push_filter(&mut qb, filter);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &Pagination,
    ) -> AppResult<Vec<TransactionRow>> {
        let mut qb = QueryBuilder::<Postgres>::new(DETAIL_SELECT);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY t.created_at DESC, t.id DESC LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.sql_offset());
        let rows = qb
            .build_query_as::<TransactionRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn sum_transactions(&self, filter: &TransactionFilter) -> AppResult<Decimal> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT COALESCE(SUM(t.amount), 0) FROM transactions t");
        push_filter(&mut qb, filter);
        let total = qb
            .build_query_scalar::<Decimal>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn create_transaction(
        &self,
        user_id: i64,
        draft: &TransactionDraft,
    ) -> AppResult<Transaction> {
        let tx = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, amount, type, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, amount, type, category_id, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(draft.amount)
        .bind(draft.kind.as_str())
        .bind(draft.category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(tx)
    }

    async fn update_transaction(&self, id: i64, draft: &TransactionDraft) -> AppResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE transactions
               SET amount = $2, type = $3, category_id = $4, updated_at = now()
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(draft.amount)
        .bind(draft.kind.as_str())
        .bind(draft.category_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_transaction(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
