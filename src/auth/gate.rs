//! Request gates: authentication (token → identity) and role requirement.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    auth::{
        identity::{self, CurrentUser, Identity},
        jwt::JwtKeys,
    },
    db::Store,
    error::{AppError, AppResult},
    state::AppState,
    users::repo_types::Role,
};

/// Pulls the credential out of an `Authorization` value. The scheme must be
/// `Bearer`; a value that does not split into exactly two space-separated
/// parts yields an empty credential, which then fails verification.
pub fn bearer_token(header: Option<&str>) -> AppResult<&str> {
    let header = header.unwrap_or_default();
    if !header.starts_with("Bearer") {
        return Err(AppError::InvalidToken);
    }
    let parts: Vec<&str> = header.split(' ').collect();
    Ok(match parts.as_slice() {
        [_, token] => *token,
        _ => "",
    })
}

/// Runs the full authentication sequence for one request.
pub async fn authenticate(
    keys: &JwtKeys,
    store: &dyn Store,
    header: Option<&str>,
) -> AppResult<CurrentUser> {
    let token = bearer_token(header)?;
    let claims = keys.verify(token).map_err(|e| {
        debug!(error = %e, "token verification failed");
        AppError::InvalidToken
    })?;
    identity::resolve(store, claims.subject_id()).await
}

/// Authentication middleware. Attaches `Identity::User` on success.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let user = authenticate(&state.keys, state.store.as_ref(), header).await?;
    req.extensions_mut().insert(Identity::User(user));
    Ok(next.run(req).await)
}

/// Checks the attached identity against a role allow-list.
pub fn check_role(identity: Option<&Identity>, allowed: &[Role]) -> AppResult<()> {
    let Some(user) = identity.and_then(Identity::user) else {
        return Err(AppError::Forbidden("unauthorized".into()));
    };
    if !allowed.contains(&user.role) {
        warn!(user_id = user.id, role = %user.role, "role not allowed");
        return Err(AppError::Forbidden("forbidden: insufficient role".into()));
    }
    Ok(())
}

pub async fn require_role(
    allowed: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    check_role(req.extensions().get::<Identity>(), allowed)?;
    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&[Role::Admin], req, next).await
}
