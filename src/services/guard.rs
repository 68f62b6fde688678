use tracing::warn;

use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::repository::UserDirectory;

/// Resolves `user_id` to an active user holding `role`, or fails with
/// `Error::Unauthorized(denial)`.
pub(crate) async fn require_active(
    users: &dyn UserDirectory,
    user_id: i64,
    role: UserRole,
    denial: &str,
) -> Result<User> {
    match users.find_user(user_id).await? {
        Some(user) if user.is_active && user.role == role => Ok(user),
        _ => Err(Error::Unauthorized(denial.to_string())),
    }
}

/// Post-commit side effects never fail the committed operation.
pub(crate) fn absorb<T>(result: Result<T>, effect: &'static str, entity_id: i64) {
    if let Err(e) = result {
        warn!(effect, entity_id, error = %e, "side effect failed after commit");
    }
}
