use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use crate::{
    auth::gate::require_admin,
    categories::{
        dto::{CategoryRequest, ListCategoriesQuery},
        repo_types::Category,
        services,
    },
    error::AppResult,
    extract::AppJson,
    pagination::Page,
    response::{ApiResponse, Message},
    state::AppState,
    validation::parse_id,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            axum::routing::put(update_category).delete(delete_category),
        )
        .route_layer(middleware::from_fn(require_admin))
}

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> AppResult<ApiResponse<Page<Category>>> {
    let page = services::list(state.store.as_ref(), &query).await?;
    Ok(ApiResponse::ok(page))
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Category>> {
    let id = parse_id(&id, "category")?;
    let category = services::get(state.store.as_ref(), id).await?;
    Ok(ApiResponse::ok(category))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> AppResult<ApiResponse<Category>> {
    let category = services::create(state.store.as_ref(), payload).await?;
    Ok(ApiResponse::ok(category))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> AppResult<ApiResponse<Category>> {
    let id = parse_id(&id, "category")?;
    let category = services::update(state.store.as_ref(), id, payload).await?;
    Ok(ApiResponse::ok(category))
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Message>> {
    let id = parse_id(&id, "category")?;
    services::delete(state.store.as_ref(), id).await?;
    Ok(ApiResponse::ok(Message::new("category deleted successfully")))
}
