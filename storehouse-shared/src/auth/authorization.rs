/// Authorization checks
///
/// Storehouse has two roles. Customer endpoints only need a valid token;
/// admin endpoints additionally need the caller's stored role to be
/// [`UserRole::Admin`](crate::models::user::UserRole::Admin). The role is read
/// from the database on every check, never from the token.
///
/// # Example
///
/// ```no_run
/// use storehouse_shared::auth::authorization::require_admin;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let admin = require_admin(&pool, user_id).await?;
/// println!("{} may manage the catalog", admin.name);
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is unknown or not an admin
    #[error("UnAuthorized Access")]
    NotAdmin,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Loads the caller and checks the admin role
///
/// # Errors
///
/// - `AuthzError::NotAdmin` when the user does not exist or is a customer
/// - `AuthzError::DatabaseError` when the lookup fails
pub async fn require_admin(pool: &PgPool, user_id: Uuid) -> Result<User, AuthzError> {
    let user = User::find_by_id(pool, user_id)
        .await?
        .ok_or(AuthzError::NotAdmin)?;

    check_admin(user)
}

/// Role check on an already loaded user
pub fn check_admin(user: User) -> Result<User, AuthzError> {
    if user.is_admin() {
        Ok(user)
    } else {
        tracing::debug!(user_id = %user.id, "Admin access denied");
        Err(AuthzError::NotAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use chrono::Utc;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone: "1".to_string(),
            address: "Somewhere".to_string(),
            answer: "a".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_check_admin_allows_admin() {
        let user = user_with_role(UserRole::Admin);
        let id = user.id;
        assert_eq!(check_admin(user).unwrap().id, id);
    }

    #[test]
    fn test_check_admin_rejects_customer() {
        let result = check_admin(user_with_role(UserRole::Customer));
        let err = result.unwrap_err();
        assert!(matches!(err, AuthzError::NotAdmin));
        assert_eq!(err.to_string(), "UnAuthorized Access");
    }
}
