use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use tracing::warn;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    users::repo_types::{Role, User},
};

/// The authenticated caller, as attached to the request by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<User> for CurrentUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            username: u.username,
            role: u.role,
        }
    }
}

/// Request-scoped caller identity, stored in the request extensions.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(CurrentUser),
}

impl Identity {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Identity::User(u) => Some(u),
            Identity::Anonymous => None,
        }
    }
}

/// Maps a verified token subject to a user. Zero or negative ids, unknown
/// ids and lookup failures are all `InvalidToken`.
pub async fn resolve(store: &dyn Store, subject_id: i64) -> AppResult<CurrentUser> {
    if subject_id <= 0 {
        warn!(subject_id, "token subject is not a valid id");
        return Err(AppError::InvalidToken);
    }
    match store.find_user_by_id(subject_id).await {
        Ok(Some(user)) => Ok(user.into()),
        Ok(None) => {
            warn!(subject_id, "token subject does not exist");
            Err(AppError::InvalidToken)
        }
        Err(e) => {
            warn!(error = %e, subject_id, "identity lookup failed");
            Err(AppError::InvalidToken)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .and_then(Identity::user)
            .cloned()
            .ok_or_else(|| AppError::Forbidden("unauthorized".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn resolves_existing_user_with_role() {
        let store = MemoryStore::default();
        let admin = store.seed_user("Root", "root", "pw", Role::Admin);
        let user = resolve(&store, admin.id).await.expect("resolve");
        assert_eq!(user.username, "root");
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn rejects_zero_and_unknown_ids() {
        let store = MemoryStore::default();
        assert!(matches!(resolve(&store, 0).await, Err(AppError::InvalidToken)));
        assert!(matches!(resolve(&store, -3).await, Err(AppError::InvalidToken)));
        assert!(matches!(resolve(&store, 999).await, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn extractor_requires_attached_identity() {
        let (mut parts, _) = axum::http::Request::new(()).into_parts();
        let err = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        parts.extensions.insert(Identity::Anonymous);
        assert!(CurrentUser::from_request_parts(&mut parts, &()).await.is_err());

        let who = CurrentUser {
            id: 1,
            name: "A".into(),
            username: "a".into(),
            role: Role::User,
        };
        parts.extensions.insert(Identity::User(who.clone()));
        assert_eq!(CurrentUser::from_request_parts(&mut parts, &()).await.unwrap(), who);
    }
}
