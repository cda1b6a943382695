use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    categories::repo::CategoryRepo, config::AppConfig, transactions::repo::TransactionRepo,
    users::repo::UserRepo,
};

/// The persistence collaborator: everything the core reads or writes goes
/// through these three repositories.
pub trait Store: UserRepo + CategoryRepo + TransactionRepo {}

impl<T> Store for T where T: UserRepo + CategoryRepo + TransactionRepo {}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pub(crate) pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// Escapes `%`, `_` and `\` so user input can be embedded in a LIKE pattern.
pub(crate) fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
