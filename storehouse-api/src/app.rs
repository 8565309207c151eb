/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use storehouse_api::{app::{build_router, AppState}, config::Config};
/// use storehouse_shared::payment::BraintreeGateway;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let gateway = BraintreeGateway::new(config.braintree.clone())?;
/// let app = build_router(AppState::new(pool, config, Arc::new(gateway)));
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiError,
    middleware::{
        auth::{is_admin, require_sign_in},
        security::SecurityHeadersLayer,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::{sync::Arc, time::Duration};
use storehouse_shared::payment::PaymentGateway;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Body limit on product create/update
///
/// Larger than the photo limit so an oversized photo gets the photo error
/// instead of a bare 413.
pub const PRODUCT_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Payment gateway used at checkout
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            gateway,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                  # Health check (public)
/// └── /api/v1/
///     ├── /auth/
///     │   ├── POST /register, /login, /forgot-password
///     │   ├── GET  /user-auth, /orders          (sign-in)
///     │   ├── PUT  /profile                     (sign-in)
///     │   └── GET  /test, /admin-auth, /all-orders, /users,
///     │       PUT  /order-status/:orderId       (admin)
///     ├── /category/
///     │   ├── GET  /get-category, /single-category/:slug
///     │   └── POST /create-category, PUT /update-category/:id,
///     │       DELETE /delete-category/:id       (admin)
///     └── /product/
///         ├── GET  /get-product, /get-product/:slug, /product-photo/:pid,
///         │        /product-count, /product-list/:page, /search/:keyword,
///         │        /related-product/:pid/:cid, /product-category/:slug,
///         │        /braintree/token
///         ├── POST /product-filters
///         ├── POST /braintree/payment           (sign-in)
///         └── POST /create-product, PUT /update-product/:pid,
///             DELETE /delete-product/:pid       (admin)
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, compression, request tracing,
/// then the per-route guards.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let sign_in = || from_fn_with_state(state.clone(), require_sign_in);
    let admin = || from_fn_with_state(state.clone(), is_admin);

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .merge(
            Router::new()
                .route("/user-auth", get(routes::auth::user_auth))
                .route("/profile", put(routes::auth::update_profile))
                .route("/orders", get(routes::orders::list_own_orders))
                .layer(sign_in()),
        )
        .merge(
            Router::new()
                .route("/test", get(routes::auth::test_protected))
                .route("/admin-auth", get(routes::auth::admin_auth))
                .route("/all-orders", get(routes::orders::list_all_orders))
                .route("/order-status/:order_id", put(routes::orders::update_order_status))
                .route("/users", get(routes::auth::list_users))
                .layer(admin())
                .layer(sign_in()),
        );

    let category_routes = Router::new()
        .route("/get-category", get(routes::category::list_categories))
        .route("/single-category/:slug", get(routes::category::get_category))
        .merge(
            Router::new()
                .route("/create-category", post(routes::category::create_category))
                .route("/update-category/:id", put(routes::category::update_category))
                .route("/delete-category/:id", delete(routes::category::delete_category))
                .layer(admin())
                .layer(sign_in()),
        );

    let product_routes = Router::new()
        .route("/get-product", get(routes::product::list_products))
        .route("/get-product/:slug", get(routes::product::get_product))
        .route("/product-photo/:pid", get(routes::product::product_photo))
        .route("/product-filters", post(routes::product::filter_products))
        .route("/product-count", get(routes::product::product_count))
        .route("/product-list/:page", get(routes::product::product_page))
        .route("/search/:keyword", get(routes::product::search_products))
        .route("/related-product/:pid/:cid", get(routes::product::related_products))
        .route("/product-category/:slug", get(routes::product::products_by_category))
        .route("/braintree/token", get(routes::payment::client_token))
        .merge(
            Router::new()
                .route("/braintree/payment", post(routes::payment::checkout))
                .layer(sign_in()),
        )
        .merge(
            Router::new()
                .route("/create-product", post(routes::product::create_product))
                .route("/update-product/:pid", put(routes::product::update_product))
                .route("/delete-product/:pid", delete(routes::product::delete_product))
                .layer(DefaultBodyLimit::max(PRODUCT_BODY_LIMIT))
                .layer(admin())
                .layer(sign_in()),
        );

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/category", category_routes)
        .nest("/product", product_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .fallback(route_not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
