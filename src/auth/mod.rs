use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod dto;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod services;

/// Public sign-up/login routes.
pub fn public_router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Routes that expect the authentication gate to run first.
pub fn protected_router() -> Router<AppState> {
    handlers::me_routes()
}
