use sqlx::SqlitePool;

use crate::{
    db::users::find_by_id,
    errors::{Error, Result},
    models::permission::PermissionContext,
};

/// Resolves the authenticated caller. A token for a user that no longer
/// exists is treated as an invalid token.
pub async fn create_context(pool: &SqlitePool, user_id: i64) -> Result<PermissionContext> {
    let user = find_by_id(pool, user_id).await?.ok_or_else(|| {
        tracing::warn!("Token subject {user_id} has no matching user");
        Error::InvalidToken
    })?;

    Ok(PermissionContext::new(user))
}
