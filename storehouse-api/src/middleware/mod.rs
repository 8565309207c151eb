/// Middleware modules for the API server
///
/// - `auth`: Sign-in and admin guards
/// - `security`: Security response headers

pub mod auth;
pub mod security;
