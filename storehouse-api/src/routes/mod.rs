/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, password reset, profile, user listing
/// - `orders`: Order history and admin order management
/// - `category`: Category CRUD
/// - `product`: Catalog CRUD, photos, filtering, search and pagination
/// - `payment`: Braintree client token and checkout

pub mod auth;
pub mod category;
pub mod health;
pub mod orders;
pub mod payment;
pub mod product;

use crate::error::{ApiError, ApiResult};
use uuid::Uuid;

/// Parses a path ID; anything that is not a UUID cannot name a record
pub(crate) fn parse_id(raw: &str, not_found: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(not_found.to_string()))
}
