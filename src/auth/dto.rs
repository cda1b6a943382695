use serde::{Deserialize, Serialize};

use crate::{auth::identity::CurrentUser, users::repo_types::Role};

/// Request body for sign-up.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: Role,
    pub token: String,
}

/// Public part of a user returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub role: Role,
}

impl From<CurrentUser> for PublicUser {
    fn from(u: CurrentUser) -> Self {
        Self {
            id: u.id,
            name: u.name,
            username: u.username,
            role: u.role,
        }
    }
}

impl From<crate::users::repo_types::User> for PublicUser {
    fn from(u: crate::users::repo_types::User) -> Self {
        CurrentUser::from(u).into()
    }
}
