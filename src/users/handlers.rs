use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, put},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{dto::PublicUser, gate::require_admin},
    error::AppResult,
    extract::AppJson,
    pagination::Page,
    response::{ApiResponse, Message},
    state::AppState,
    users::{
        dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest},
        services,
    },
    validation::parse_id,
};

/// User administration; admin role only.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users).post(create_user))
        .route("/admin/users/:id", put(update_user).delete(delete_user))
        .route_layer(middleware::from_fn(require_admin))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> AppResult<ApiResponse<Page<PublicUser>>> {
    let page = services::list_users(state.store.as_ref(), &query).await?;
    Ok(ApiResponse::ok(page))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = services::create_user(state.store.as_ref(), payload).await?;
    Ok(ApiResponse::ok(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<ApiResponse<PublicUser>> {
    let id = parse_id(&id, "user")?;
    let user = services::update_user(state.store.as_ref(), id, payload).await?;
    Ok(ApiResponse::ok(user.into()))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Message>> {
    let id = parse_id(&id, "user")?;
    services::delete_user(state.store.as_ref(), id).await?;
    Ok(ApiResponse::ok(Message::new("user deleted successfully")))
}
