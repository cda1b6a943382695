use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    categories::repo_types::Category,
    db::{like_pattern, PgStore},
    error::AppResult,
    pagination::Pagination,
};

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    async fn find_category(&self, id: i64) -> AppResult<Option<Category>>;
    /// Case-insensitive exact match on the name.
    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>>;
    /// Counts categories whose name contains `search` (case-insensitive).
    async fn count_categories(&self, search: Option<&str>) -> AppResult<i64>;
    async fn list_categories(&self, search: Option<&str>, page: &Pagination)
        -> AppResult<Vec<Category>>;
    async fn create_category(&self, name: &str) -> AppResult<Category>;
    async fn update_category(&self, id: i64, name: &str) -> AppResult<Option<Category>>;
    async fn delete_category(&self, id: i64) -> AppResult<bool>;
}

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(search) = search {
        qb.push(" WHERE name ILIKE ").push_bind(like_pattern(search));
    }
}

#[async_trait]
impl CategoryRepo for PgStore {
    async fn find_category(&self, id: i64) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn find_category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, created_at, updated_at FROM categories WHERE LOWER(name) = LOWER($1)",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn count_categories(&self, search: Option<&str>) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM categories");
        push_search(&mut qb, search);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn list_categories(
        &self,
        search: Option<&str>,
        page: &Pagination,
    ) -> AppResult<Vec<Category>> {
        let mut qb =
            QueryBuilder::<Postgres>::new("SELECT id, name, created_at, updated_at FROM categories");
        push_search(&mut qb, search);
        qb.push(" ORDER BY name ASC, id ASC LIMIT ")
            .push_bind(page.sql_limit())
            .push(" OFFSET ")
            .push_bind(page.sql_offset());
        let rows = qb.build_query_as::<Category>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name)
            VALUES ($1)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update_category(&self, id: i64, name: &str) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = $2, updated_at = now()
             WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn delete_category(&self, id: i64) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
