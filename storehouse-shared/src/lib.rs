//! # Storehouse Shared Library
//!
//! Types, persistence and business rules shared by the Storehouse API server
//! and its tooling.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, categories, products, orders)
//! - `auth`: Password hashing, JWT tokens, bearer extraction, admin checks
//! - `db`: Connection pool and migrations
//! - `payment`: Payment gateway contract, Braintree client, cart validation
//! - `slug`: URL slug generation

pub mod auth;
pub mod db;
pub mod models;
pub mod payment;
pub mod slug;

/// Current version of the Storehouse shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
