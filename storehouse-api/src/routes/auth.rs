/// Authentication and account endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Create a customer account
/// - `POST /api/v1/auth/login` - Exchange credentials for a bearer token
/// - `POST /api/v1/auth/forgot-password` - Reset a password with the security answer
/// - `GET  /api/v1/auth/test` - Admin-only probe
/// - `GET  /api/v1/auth/user-auth` - Signed-in probe
/// - `GET  /api/v1/auth/admin-auth` - Admin probe
/// - `PUT  /api/v1/auth/profile` - Update the caller's profile
/// - `GET  /api/v1/auth/users` - List every account (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Duration;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use storehouse_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, UpdateProfile, User, UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
///
/// Absent fields deserialize as empty strings so they reach validation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is Required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Email is Required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is Required"))]
    pub password: String,

    #[validate(length(min = 1, message = "Phone no is Required"))]
    pub phone: String,

    #[validate(length(min = 1, message = "Address is Required"))]
    pub address: String,

    #[validate(length(min = 1, message = "Answer is Required"))]
    pub answer: String,
}

const REGISTER_FIELDS: [&str; 6] = ["name", "email", "password", "phone", "address", "answer"];

/// Login request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public account fields returned at login
#[derive(Debug, Serialize)]
pub struct LoginUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub role: UserRole,
}

impl From<User> for LoginUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            address: user.address,
            role: user.role,
        }
    }
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: LoginUser,
    pub token: String,
}

/// Forgot password request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "answer is required"))]
    pub answer: String,

    #[validate(length(min = 1, message = "New Password is required"))]
    pub new_password: String,
}

const FORGOT_PASSWORD_FIELDS: [&str; 3] = ["email", "answer", "new_password"];

/// Profile update request; empty or absent fields keep the stored value
///
/// `email` is accepted for compatibility and ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Register a new customer
///
/// # Errors
///
/// - `400 Bad Request`: A required field is missing (`"<Field> is Required"`)
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    req.validate()
        .map_err(|e| ApiError::from_validation(e, &REGISTER_FIELDS))?;

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::Conflict("Already Register please login".to_string()));
    }

    let password_hash = password::hash_password_blocking(req.password).await?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            phone: req.phone,
            address: req.address,
            answer: req.answer,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User Register Successfully",
            "user": user,
        })),
    ))
}

/// Login with email and password
///
/// # Errors
///
/// - `400 Bad Request`: Email or password missing
/// - `404 Not Found`: No account with this email
/// - `401 Unauthorized`: Wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Invalid email or password".to_string()));
    }

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("Email is not registered".to_string()))?;

    let valid = password::verify_password_blocking(req.password, user.password_hash.clone()).await?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized("Invalid Password".to_string()));
    }

    let claims = jwt::Claims::with_expiration(
        user.id,
        Duration::days(state.config.jwt.expiration_days),
    );
    let token = jwt::create_token(&claims, state.config.jwt.secret.expose_secret())?;

    Ok(Json(LoginResponse {
        success: true,
        message: "login successfully".to_string(),
        user: LoginUser::from(user),
        token,
    }))
}

/// Reset a password using the security answer
///
/// # Errors
///
/// - `400 Bad Request`: Email, answer or new password missing
/// - `404 Not Found`: Email and answer do not match an account
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()
        .map_err(|e| ApiError::from_validation(e, &FORGOT_PASSWORD_FIELDS))?;

    let user = User::find_by_email_and_answer(&state.db, &req.email, &req.answer)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wrong Email Or Answer".to_string()))?;

    let password_hash = password::hash_password_blocking(req.new_password).await?;
    User::update_password(&state.db, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password reset");

    Ok(Json(json!({
        "success": true,
        "message": "Password Reset Successfully",
    })))
}

/// Admin-only probe
pub async fn test_protected() -> &'static str {
    "Protected Routes"
}

/// Signed-in probe used by the storefront's private routes
pub async fn user_auth() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Admin probe used by the dashboard routes
pub async fn admin_auth() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// Update the caller's profile
///
/// # Errors
///
/// - `400 Bad Request`: Password given but shorter than 6 characters
/// - `404 Not Found`: The account no longer exists
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Value>> {
    let new_password = non_empty(req.password);
    if let Some(p) = &new_password {
        password::validate_password_length(p).map_err(ApiError::BadRequest)?;
    }

    let password_hash = match new_password {
        Some(p) => Some(password::hash_password_blocking(p).await?),
        None => None,
    };

    let updated_user = User::update_profile(
        &state.db,
        auth.user_id,
        UpdateProfile {
            name: non_empty(req.name),
            password_hash,
            phone: non_empty(req.phone),
            address: non_empty(req.address),
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile Updated Successfully",
        "updatedUser": updated_user,
    })))
}

/// Every account, newest first
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(User::list_all(&state.db).await?))
}
