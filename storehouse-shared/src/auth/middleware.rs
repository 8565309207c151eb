/// Request authentication for Axum
///
/// Turns the `Authorization` header into an [`AuthContext`]. The server's
/// sign-in layer calls [`authenticate`] and stores the context in request
/// extensions; handlers read it back with `Extension<AuthContext>`.
///
/// # Accepted header forms
///
/// - `Authorization: Bearer <token>`
/// - `Authorization: <token>`
///
/// With the `Bearer ` prefix the token is the second space-separated field,
/// so `"Bearer "` and `"Bearer   x"` carry no token.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use storehouse_shared::auth::jwt::{create_token, Claims};
/// use storehouse_shared::auth::middleware::authenticate;
/// use uuid::Uuid;
///
/// let secret = "your-secret-key-at-least-32-bytes";
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id), secret).unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
/// );
///
/// let auth = authenticate(&headers, secret).unwrap();
/// assert_eq!(auth.user_id, user_id);
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID (token subject)
    pub user_id: Uuid,
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable `Authorization` header
    #[error("Authorization header missing")]
    MissingCredentials,

    /// Header present but no token in it
    #[error("Token missing")]
    MissingToken,

    /// Token failed validation
    #[error("Invalid or expired token")]
    InvalidToken(#[source] JwtError),
}

/// Pulls the token out of an `Authorization` header value
///
/// # Errors
///
/// Returns `AuthError::MissingToken` when no token remains after the prefix.
pub fn extract_token(header_value: &str) -> Result<&str, AuthError> {
    let token = if header_value.starts_with("Bearer ") {
        header_value.split(' ').nth(1).unwrap_or_default()
    } else {
        header_value
    };

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(token)
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// - `AuthError::MissingCredentials` when the header is absent, empty or not ASCII
/// - `AuthError::MissingToken` when the header carries no token
/// - `AuthError::InvalidToken` when the token does not validate
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let token = extract_token(header_value)?;
    let claims = validate_token(token, secret).map_err(AuthError::InvalidToken)?;

    Ok(AuthContext {
        user_id: claims.sub,
    })
}
