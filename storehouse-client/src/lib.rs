//! # Storehouse Client
//!
//! Client-side state and HTTP access for the Storehouse API, for storefronts
//! and tools that talk to the server.
//!
//! ## Module Organization
//!
//! - `storage`: Key/value file that survives restarts (`auth`, `cart`)
//! - `auth`: Signed-in user and token
//! - `cart`: Shopping cart
//! - `search`: Last search keyword and results
//! - `api`: Typed client for every `/api/v1` endpoint
//! - `types`: Response payloads
//! - `error`: Error types
//!
//! ## Example
//!
//! ```no_run
//! use storehouse_client::{ApiClient, AuthStore, Storage};
//!
//! # async fn example() -> Result<(), storehouse_client::ClientError> {
//! let storage = Storage::open("storehouse-state.json");
//! let mut auth = AuthStore::load(storage.clone());
//!
//! let mut api = ApiClient::new("http://localhost:8080")?;
//! let login = api.login("jane@example.com", "secret1").await?;
//! auth.set(login.into())?;
//! api.set_token(auth.token());
//!
//! let orders = api.orders().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod error;
pub mod search;
pub mod storage;
pub mod types;

pub use api::ApiClient;
pub use auth::{AuthState, AuthStore};
pub use cart::Cart;
pub use error::{ClientError, StorageError};
pub use search::SearchState;
pub use storage::Storage;
