//! Who may see or change which transaction.

use tracing::warn;

use crate::{
    auth::identity::CurrentUser,
    db::Store,
    error::{AppError, AppResult},
    transactions::repo_types::Transaction,
};

pub const NOT_FOUND: &str = "transaction not found";
pub const NOT_OWNER: &str = "unauthorized: transaction does not belong to this user";

/// Only the owner may act on a single record. Admins get no exemption here.
pub fn ensure_owner(caller: &CurrentUser, tx: &Transaction) -> AppResult<()> {
    if tx.user_id != caller.id {
        warn!(
            user_id = caller.id,
            transaction_id = tx.id,
            owner_id = tx.user_id,
            "transaction access denied"
        );
        return Err(AppError::Forbidden(NOT_OWNER.into()));
    }
    Ok(())
}

/// Loads a transaction and checks ownership; absence wins over foreign ownership.
pub async fn load_owned(store: &dyn Store, caller: &CurrentUser, id: i64) -> AppResult<Transaction> {
    let tx = store
        .find_transaction(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.into()))?;
    ensure_owner(caller, &tx)?;
    Ok(tx)
}

/// Owner filter for list and balance queries. Admins may pass a `user_id`;
/// an absent, unparseable or non-positive value means every user. Everyone
/// else is pinned to their own rows.
pub fn list_owner(caller: &CurrentUser, requested: Option<&str>) -> Option<i64> {
    if !caller.is_admin() {
        return Some(caller.id);
    }
    requested
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{transactions::repo_types::TransactionType, users::repo_types::Role};
    use rust_decimal_macros::dec;
    use time::OffsetDateTime;

    fn caller(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            name: format!("user {id}"),
            username: format!("user{id}"),
            role,
        }
    }

    fn owned_by(user_id: i64) -> Transaction {
        Transaction {
            id: 9,
            user_id,
            amount: dec!(12.50),
            kind: TransactionType::Expense,
            category_id: 1,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn owner_passes() {
        assert!(ensure_owner(&caller(1, Role::User), &owned_by(1)).is_ok());
    }

    #[test]
    fn admin_is_not_exempt() {
        let err = ensure_owner(&caller(2, Role::Admin), &owned_by(1)).unwrap_err();
        match err {
            AppError::Forbidden(msg) => assert_eq!(msg, NOT_OWNER),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_owner_pins_regular_users() {
        let user = caller(5, Role::User);
        assert_eq!(list_owner(&user, None), Some(5));
        assert_eq!(list_owner(&user, Some("7")), Some(5));
    }

    #[test]
    fn list_owner_lets_admins_choose() {
        let admin = caller(1, Role::Admin);
        assert_eq!(list_owner(&admin, None), None);
        assert_eq!(list_owner(&admin, Some("7")), Some(7));
        assert_eq!(list_owner(&admin, Some("seven")), None);
        assert_eq!(list_owner(&admin, Some("0")), None);
    }
}
