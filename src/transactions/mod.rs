pub mod billing;
pub mod dto;
pub mod handlers;
pub mod policy;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

/// Ledger routes; every one runs behind the authentication gate.
pub fn router() -> Router<AppState> {
    handlers::routes()
}
