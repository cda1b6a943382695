use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest},
        identity::CurrentUser,
        services,
    },
    error::AppResult,
    extract::AppJson,
    response::ApiResponse,
    state::AppState,
};

/// Routes reachable without a token.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes that need the authentication gate.
pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<ApiResponse<PublicUser>> {
    let user = services::register(state.store.as_ref(), payload).await?;
    Ok(ApiResponse::ok(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let res = services::login(state.store.as_ref(), &state.keys, payload).await?;
    Ok(ApiResponse::ok(res))
}

#[instrument(skip_all, fields(user_id = user.id))]
pub async fn get_me(user: CurrentUser) -> AppResult<ApiResponse<PublicUser>> {
    Ok(ApiResponse::ok(user.into()))
}
