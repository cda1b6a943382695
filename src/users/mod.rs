pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub fn admin_router() -> Router<AppState> {
    handlers::admin_routes()
}
