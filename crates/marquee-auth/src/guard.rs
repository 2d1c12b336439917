//! Role guards applied after the caller is identified.

use marquee_core::error::AppError;
use marquee_domain::user::UserRole;

/// Allow `role` if it is at least `min`, else 403.
pub fn require_role(role: UserRole, min: UserRole) -> Result<(), AppError> {
    if role >= min {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
