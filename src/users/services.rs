use tracing::{info, instrument, warn};

use crate::{
    auth::{dto::PublicUser, password::hash_password},
    db::Store,
    error::{AppError, AppResult},
    pagination::{Page, Pagination},
    users::{
        dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest},
        repo_types::{NewUser, Role, User, UserChanges},
    },
    validation::{is_blank, Checks},
};

pub(crate) const NOT_FOUND: &str = "user not found";

/// Parses an optional role string; blank means "not given".
fn parse_role(raw: Option<&str>, checks: &mut Checks) -> Option<Role> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    let role = raw.parse::<Role>().ok();
    checks.ensure(role.is_some(), "role must be either user or admin");
    role
}

async fn ensure_username_free(
    store: &dyn Store,
    username: &str,
    except: Option<i64>,
) -> AppResult<()> {
    match store.find_user_by_username(username).await? {
        Some(existing) if Some(existing.id) != except => {
            warn!(existing_id = existing.id, "username already used");
            Err(AppError::Conflict("username already used".into()))
        }
        _ => Ok(()),
    }
}

async fn existing(store: &dyn Store, id: i64) -> AppResult<User> {
    store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))
}

#[instrument(skip(store))]
pub async fn list_users(store: &dyn Store, query: &ListUsersQuery) -> AppResult<Page<PublicUser>> {
    let pagination = Pagination::from_query(query.limit.as_deref(), query.page.as_deref());
    let total = store.count_users().await?;
    let users = store.list_users(&pagination).await?;
    Ok(Page::new(total, &pagination, users).map(PublicUser::from))
}

#[instrument(skip(store, req), fields(username = %req.username))]
pub async fn create_user(store: &dyn Store, req: CreateUserRequest) -> AppResult<User> {
    let mut checks = Checks::new();
    checks
        .require("name", &req.name)
        .require("username", &req.username)
        .require("password", &req.password);
    let role = parse_role(req.role.as_deref(), &mut checks);
    checks.finish()?;

    let username = req.username.trim().to_string();
    ensure_username_free(store, &username, None).await?;

    let new = NewUser {
        name: req.name.trim().to_string(),
        username,
        password_hash: hash_password(&req.password)?,
        role: role.unwrap_or_default(),
    };
    let user = store.create_user(&new).await?;
    info!(user_id = user.id, role = %user.role, "user created by admin");
    Ok(user)
}

#[instrument(skip(store, req), fields(user_id = id))]
pub async fn update_user(store: &dyn Store, id: i64, req: UpdateUserRequest) -> AppResult<User> {
    let mut checks = Checks::new();
    checks
        .require("name", &req.name)
        .require("username", &req.username);
    let role = parse_role(req.role.as_deref(), &mut checks);
    checks.finish()?;

    let current = existing(store, id).await?;
    let username = req.username.trim().to_string();
    ensure_username_free(store, &username, Some(id)).await?;

    let password_hash = match req.password.as_deref().filter(|p| !is_blank(p)) {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let changes = UserChanges {
        name: req.name.trim().to_string(),
        username,
        password_hash,
        role: role.unwrap_or(current.role),
    };
    let user = store
        .update_user(id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    info!(user_id = id, "user updated");
    Ok(user)
}

/// Deletes the account; its transactions go with it.
#[instrument(skip(store))]
pub async fn delete_user(store: &dyn Store, id: i64) -> AppResult<()> {
    if !store.delete_user(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.into()));
    }
    info!(user_id = id, "user deleted");
    Ok(())
}
