use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use time::{Date, OffsetDateTime};
use tracing::instrument;

use crate::{
    auth::identity::CurrentUser,
    error::AppResult,
    extract::AppJson,
    pagination::Page,
    response::{ApiResponse, Message},
    state::AppState,
    transactions::{
        dto::{Balance, BalanceQuery, ListTransactionsQuery, TransactionDetails, TransactionInput},
        services,
    },
    validation::parse_id,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/:id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
        .route("/balance", get(get_balance))
}

fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListTransactionsQuery>,
) -> AppResult<ApiResponse<Page<TransactionDetails>>> {
    let page = services::list(state.store.as_ref(), &user, &query, today()).await?;
    Ok(ApiResponse::ok(page))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_balance(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<BalanceQuery>,
) -> AppResult<ApiResponse<Balance>> {
    let balance = services::balance(state.store.as_ref(), &user, &query, today()).await?;
    Ok(ApiResponse::ok(balance))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<TransactionDetails>> {
    let id = parse_id(&id, "transaction")?;
    let tx = services::get(state.store.as_ref(), &user, id).await?;
    Ok(ApiResponse::ok(tx))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn create_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(payload): AppJson<TransactionInput>,
) -> AppResult<ApiResponse<TransactionDetails>> {
    let tx = services::create(state.store.as_ref(), &user, payload).await?;
    Ok(ApiResponse::ok(tx))
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn update_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<TransactionInput>,
) -> AppResult<ApiResponse<TransactionDetails>> {
    let id = parse_id(&id, "transaction")?;
    let tx = services::update(state.store.as_ref(), &user, id, payload).await?;
    Ok(ApiResponse::ok(tx))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Message>> {
    let id = parse_id(&id, "transaction")?;
    services::delete(state.store.as_ref(), &user, id).await?;
    Ok(ApiResponse::ok(Message::new("transaction deleted successfully")))
}
