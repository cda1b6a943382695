use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    db::Store,
    error::{AppError, AppResult},
    users::repo_types::{NewUser, Role, User},
    validation::Checks,
};

/// Creates a `user`-role account.
#[instrument(skip(store, req), fields(username = %req.username))]
pub async fn register(store: &dyn Store, req: RegisterRequest) -> AppResult<User> {
    Checks::new()
        .require("name", &req.name)
        .require("username", &req.username)
        .require("password", &req.password)
        .finish()?;

    let username = req.username.trim().to_string();
    if store.find_user_by_username(&username).await?.is_some() {
        warn!("username already used");
        return Err(AppError::Conflict("username already used".into()));
    }

    let new = NewUser {
        name: req.name.trim().to_string(),
        username,
        password_hash: hash_password(&req.password)?,
        role: Role::User,
    };
    let user = store.create_user(&new).await?;
    info!(user_id = user.id, "user registered");
    Ok(user)
}

/// Checks credentials and issues a bearer token.
#[instrument(skip(store, keys, req), fields(username = %req.username))]
pub async fn login(store: &dyn Store, keys: &JwtKeys, req: LoginRequest) -> AppResult<LoginResponse> {
    Checks::new()
        .require("username", &req.username)
        .require("password", &req.password)
        .finish()?;

    let Some(user) = store.find_user_by_username(req.username.trim()).await? else {
        warn!("login unknown username");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.issue(user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(LoginResponse {
        id: user.id,
        name: user.name,
        username: user.username,
        role: user.role,
        token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn signup(name: &str, username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_verifiable_token() {
        let store = MemoryStore::default();
        let keys = JwtKeys::new("secret").unwrap();

        let user = register(&store, signup("Ana", "ana", "hunter22")).await.unwrap();
        assert_eq!(user.role, Role::User);
        assert_ne!(user.password_hash, "hunter22");

        let res = login(
            &store,
            &keys,
            LoginRequest {
                username: "ana".into(),
                password: "hunter22".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(res.id, user.id);
        assert_eq!(keys.verify(&res.token).unwrap().subject_id(), user.id);
    }

    #[tokio::test]
    async fn register_rejects_blank_fields_and_duplicates() {
        let store = MemoryStore::default();
        let err = register(&store, signup(" ", "", "pw")).await.unwrap_err();
        match err {
            AppError::Validation(msgs) => assert_eq!(msgs.len(), 2),
            other => panic!("unexpected {other:?}"),
        }

        register(&store, signup("Ana", "ana", "pw")).await.unwrap();
        let err = register(&store, signup("Other", "ana", "pw")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(m) if m == "username already used"));
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let store = MemoryStore::default();
        let keys = JwtKeys::new("secret").unwrap();
        store.seed_user("Ana", "ana", "right", Role::User);

        for (username, password) in [("ana", "wrong"), ("nobody", "right")] {
            let err = login(
                &store,
                &keys,
                LoginRequest {
                    username: username.into(),
                    password: password.into(),
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials));
        }
    }
}
