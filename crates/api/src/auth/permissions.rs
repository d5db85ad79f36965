use infra::models::UserRow;
use infra::store::UserStore;

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

/// Resolve verified claims to the current user row. The store is the
/// source of truth for roles, so a stale token cannot keep privileges a
/// user no longer holds.
pub async fn current_user(state: &AppState, claims: &Claims) -> Result<UserRow, AppError> {
    let user_id = claims.user_id()?;

    state
        .store
        .get_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("user no longer exists".to_string()))
}

pub async fn require_admin(state: &AppState, claims: &Claims) -> Result<UserRow, AppError> {
    let user = current_user(state, claims).await?;

    if !user.is_admin() {
        return Err(AppError::Forbidden("admin access required".to_string()));
    }

    Ok(user)
}
