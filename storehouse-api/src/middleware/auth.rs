/// Route guards
///
/// `require_sign_in` validates the bearer token and stores the caller's
/// [`AuthContext`] in the request extensions. `is_admin` runs after it and
/// lets only accounts with the admin role through; the role is read from the
/// database on every request so a demotion takes effect immediately.
///
/// Handlers behind these guards read the caller with `Extension<AuthContext>`.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use secrecy::ExposeSecret;
use storehouse_shared::auth::{
    authorization::require_admin,
    middleware::{authenticate, AuthContext, AuthError},
};

/// Rejects requests without a valid bearer token
pub async fn require_sign_in(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.config.jwt.secret.expose_secret()).map_err(|e| {
        match &e {
            AuthError::InvalidToken(source) => {
                tracing::warn!(error = %source, path = %req.uri().path(), "Token rejected")
            }
            _ => tracing::debug!(error = %e, path = %req.uri().path(), "Sign-in required"),
        }
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Rejects callers that are not admins
///
/// Must be layered inside [`require_sign_in`].
pub async fn is_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .copied()
        .ok_or_else(|| ApiError::Unauthorized("UnAuthorized Access".to_string()))?;

    require_admin(&state.db, auth.user_id).await.map_err(|e| {
        tracing::warn!(user_id = %auth.user_id, error = %e, "Admin access rejected");
        ApiError::from(e)
    })?;

    Ok(next.run(req).await)
}
