use rust_decimal::Decimal;
use time::Date;
use tracing::{info, instrument};

use crate::{
    auth::identity::CurrentUser,
    categories,
    db::Store,
    error::{AppError, AppResult},
    pagination::{Page, Pagination},
    transactions::{
        billing::BillingWindow,
        dto::{Balance, BalanceQuery, ListTransactionsQuery, TransactionDetails, TransactionInput},
        policy::{self, NOT_FOUND},
        repo_types::{TransactionDraft, TransactionFilter, TransactionType},
    },
    validation::{is_blank, Checks},
};

/// Validates a create/update body, collecting every failure.
async fn draft(store: &dyn Store, input: TransactionInput) -> AppResult<TransactionDraft> {
    let mut checks = Checks::new();
    checks.ensure(
        input.amount > Decimal::ZERO,
        "amount must be greater than 0",
    );
    let kind = if is_blank(&input.kind) {
        checks.ensure(false, "type is required");
        None
    } else {
        let parsed = input.kind.parse::<TransactionType>().ok();
        checks.ensure(parsed.is_some(), "type must be either income or expense");
        parsed
    };
    checks.ensure(input.category_id > 0, "category_id is required");
    checks.finish()?;

    if store.find_category(input.category_id).await?.is_none() {
        return Err(AppError::NotFound(categories::services::NOT_FOUND.into()));
    }

    Ok(TransactionDraft {
        amount: input.amount,
        kind: kind.ok_or_else(|| AppError::validation("type is required"))?,
        category_id: input.category_id,
    })
}

async fn details(store: &dyn Store, id: i64) -> AppResult<TransactionDetails> {
    store
        .find_transaction_details(id)
        .await?
        .map(TransactionDetails::from)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

fn parse_category_filter(raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::validation("category_id must be an integer")),
    }
}

#[instrument(skip(store, caller), fields(user_id = caller.id))]
pub async fn list(
    store: &dyn Store,
    caller: &CurrentUser,
    query: &ListTransactionsQuery,
    today: Date,
) -> AppResult<Page<TransactionDetails>> {
    let filter = TransactionFilter {
        user_id: policy::list_owner(caller, query.user_id.as_deref()),
        category_id: parse_category_filter(query.category_id.as_deref())?,
        kind: query
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string),
        window: Some(BillingWindow::resolve(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            today,
        )?),
    };
    let pagination = Pagination::from_query(query.limit.as_deref(), query.page.as_deref());

    let total = store.count_transactions(&filter).await?;
    let rows = store.list_transactions(&filter, &pagination).await?;
    Ok(Page::new(total, &pagination, rows).map(TransactionDetails::from))
}

#[instrument(skip(store, caller), fields(user_id = caller.id))]
pub async fn balance(
    store: &dyn Store,
    caller: &CurrentUser,
    query: &BalanceQuery,
    today: Date,
) -> AppResult<Balance> {
    let window = BillingWindow::resolve(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        today,
    )?;
    // Always the caller's own ledger, admins included.
    let of_kind = |kind: TransactionType| TransactionFilter {
        user_id: Some(caller.id),
        kind: Some(kind.as_str().to_string()),
        window: Some(window),
        ..Default::default()
    };

    let income_total = store.sum_transactions(&of_kind(TransactionType::Income)).await?;
    let expense_total = store.sum_transactions(&of_kind(TransactionType::Expense)).await?;
    Ok(Balance {
        user_id: caller.id,
        income_total,
        expense_total,
        net: income_total - expense_total,
        window,
    })
}

#[instrument(skip(store, caller), fields(user_id = caller.id))]
pub async fn get(store: &dyn Store, caller: &CurrentUser, id: i64) -> AppResult<TransactionDetails> {
    policy::load_owned(store, caller, id).await?;
    details(store, id).await
}

#[instrument(skip(store, caller, input), fields(user_id = caller.id))]
pub async fn create(
    store: &dyn Store,
    caller: &CurrentUser,
    input: TransactionInput,
) -> AppResult<TransactionDetails> {
    let draft = draft(store, input).await?;
    let tx = store.create_transaction(caller.id, &draft).await?;
    info!(transaction_id = tx.id, amount = %tx.amount, kind = %tx.kind, "transaction created");
    details(store, tx.id).await
}

#[instrument(skip(store, caller, input), fields(user_id = caller.id))]
pub async fn update(
    store: &dyn Store,
    caller: &CurrentUser,
    id: i64,
    input: TransactionInput,
) -> AppResult<TransactionDetails> {
    policy::load_owned(store, caller, id).await?;
    let draft = draft(store, input).await?;
    if !store.update_transaction(id, &draft).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    info!(transaction_id = id, "transaction updated");
    details(store, id).await
}

#[instrument(skip(store, caller), fields(user_id = caller.id))]
pub async fn delete(store: &dyn Store, caller: &CurrentUser, id: i64) -> AppResult<()> {
    policy::load_owned(store, caller, id).await?;
    if !store.delete_transaction(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    info!(transaction_id = id, "transaction deleted");
    Ok(())
}
