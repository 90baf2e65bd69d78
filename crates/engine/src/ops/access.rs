use sea_orm::{ConnectionTrait, prelude::*};

use crate::{Caller, EngineError, ResultEngine, users};

/// Returns the caller or fails with `Unauthorized` for anonymous requests.
pub(super) fn authenticated(caller: Option<&Caller>) -> ResultEngine<&Caller> {
    caller.ok_or_else(|| EngineError::Unauthorized("authentication required".to_string()))
}

/// Admin-only operations reject everybody else with `Unauthorized`.
pub(super) fn require_admin(caller: Option<&Caller>) -> ResultEngine<&Caller> {
    let caller = authenticated(caller)?;
    if !caller.is_admin {
        return Err(EngineError::Unauthorized("admin required".to_string()));
    }
    Ok(caller)
}

/// A user may only read the records scoped to its own id.
pub(super) fn require_same_user(caller: Option<&Caller>, user_id: i32) -> ResultEngine<&Caller> {
    let caller = authenticated(caller)?;
    if caller.user_id != user_id {
        return Err(EngineError::Unauthorized(
            "cannot access another user's transactions".to_string(),
        ));
    }
    Ok(caller)
}

/// Resource-level check: admins, or an owner of the resource.
pub(super) fn require_admin_or_owner(caller: &Caller, is_owner: bool) -> ResultEngine<()> {
    if caller.is_admin || is_owner {
        return Ok(());
    }
    Err(EngineError::Forbidden(
        "resource belongs to another user".to_string(),
    ))
}

pub(super) async fn require_user_exists<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> ResultEngine<users::Model> {
    users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
}
