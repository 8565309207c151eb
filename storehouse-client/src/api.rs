/// HTTP client for the Storehouse API.
///
/// One method per `/api/v1` endpoint. The session token, when set, is sent
/// in the `Authorization` header of every request. Non-success responses
/// become [`ClientError::Api`] carrying the server's `message`.

use crate::cart::Cart;
use crate::error::ClientError;
use crate::types::{
    AuthUser, Category, CategoryProducts, LoginResponse, MessageResponse, Order, Photo, Product,
    ProductFilter, ProductForm, ProfileUpdate, RegisterForm,
};
use reqwest::{header, multipart, Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed client for the `/api/v1` endpoints
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(alias = "products", alias = "product", alias = "category", alias = "user", alias = "updatedUser")]
    data: T,
}

#[derive(Deserialize)]
struct CountResponse {
    total: i64,
}

#[derive(Deserialize)]
struct AuthCheck {
    ok: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenResponse {
    client_token: String,
}

impl ApiClient {
    /// Client for the server at `base_url` (e.g. `http://localhost:8080`).
    ///
    /// # Errors
    ///
    /// Fails when `base_url` is not an absolute HTTP(S) URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Sets or clears the session token.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    /// Token sent with each request, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let mut full = vec!["api", "v1"];
        full.extend_from_slice(segments);
        let url = self.url(&full);

        tracing::debug!(%method, %url, "API request");

        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(header::AUTHORIZATION, token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let response = check(builder.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn send_data<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        Ok(Self::send::<Envelope<T>>(builder).await?.data)
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<Value, ClientError> {
        Self::send(self.client.get(self.url(&["health"]))).await
    }

    // Accounts

    /// Creates an account.
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthUser, ClientError> {
        Self::send_data(self.request(Method::POST, &["auth", "register"]).json(form)).await
    }

    /// Exchanges credentials for a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        Self::send(
            self.request(Method::POST, &["auth", "login"])
                .json(&json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Resets a password with the account's security answer.
    pub async fn forgot_password(
        &self,
        email: &str,
        answer: &str,
        new_password: &str,
    ) -> Result<MessageResponse, ClientError> {
        Self::send(
            self.request(Method::POST, &["auth", "forgot-password"])
                .json(&json!({ "email": email, "answer": answer, "newPassword": new_password })),
        )
        .await
    }

    /// Updates the signed-in user's profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthUser, ClientError> {
        Self::send_data(self.request(Method::PUT, &["auth", "profile"]).json(update)).await
    }

    async fn auth_check(&self, path: &str) -> Result<bool, ClientError> {
        match Self::send::<AuthCheck>(self.request(Method::GET, &["auth", path])).await {
            Ok(check) => Ok(check.ok),
            Err(ClientError::Api { status, .. }) if status == StatusCode::UNAUTHORIZED.as_u16() => {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the current token is accepted.
    pub async fn user_auth(&self) -> Result<bool, ClientError> {
        self.auth_check("user-auth").await
    }

    /// Whether the current token belongs to an admin.
    pub async fn admin_auth(&self) -> Result<bool, ClientError> {
        self.auth_check("admin-auth").await
    }

    /// Every account (admin).
    pub async fn users(&self) -> Result<Vec<AuthUser>, ClientError> {
        Self::send(self.request(Method::GET, &["auth", "users"])).await
    }

    // Orders

    /// Orders of the signed-in user.
    pub async fn orders(&self) -> Result<Vec<Order>, ClientError> {
        Self::send(self.request(Method::GET, &["auth", "orders"])).await
    }

    /// Every order (admin).
    pub async fn all_orders(&self) -> Result<Vec<Order>, ClientError> {
        Self::send(self.request(Method::GET, &["auth", "all-orders"])).await
    }

    /// Changes an order's status (admin).
    pub async fn update_order_status(&self, order_id: Uuid, status: &str) -> Result<Order, ClientError> {
        let id = order_id.to_string();
        Self::send(
            self.request(Method::PUT, &["auth", "order-status", &id])
                .json(&json!({ "status": status })),
        )
        .await
    }

    // Categories

    /// All categories
    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        Self::send_data(self.request(Method::GET, &["category", "get-category"])).await
    }

    /// Category by slug
    pub async fn category(&self, slug: &str) -> Result<Category, ClientError> {
        Self::send_data(self.request(Method::GET, &["category", "single-category", slug])).await
    }

    /// Creates a category (admin).
    pub async fn create_category(&self, name: &str) -> Result<Category, ClientError> {
        Self::send_data(
            self.request(Method::POST, &["category", "create-category"])
                .json(&json!({ "name": name })),
        )
        .await
    }

    /// Renames a category (admin).
    pub async fn update_category(&self, id: Uuid, name: &str) -> Result<Category, ClientError> {
        let id = id.to_string();
        Self::send_data(
            self.request(Method::PUT, &["category", "update-category", &id])
                .json(&json!({ "name": name })),
        )
        .await
    }

    /// Deletes a category (admin).
    pub async fn delete_category(&self, id: Uuid) -> Result<MessageResponse, ClientError> {
        let id = id.to_string();
        Self::send(self.request(Method::DELETE, &["category", "delete-category", &id])).await
    }

    // Products

    /// Newest products.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        Self::send_data(self.request(Method::GET, &["product", "get-product"])).await
    }

    /// Product by slug
    pub async fn product(&self, slug: &str) -> Result<Product, ClientError> {
        Self::send_data(self.request(Method::GET, &["product", "get-product", slug])).await
    }

    /// Photo bytes and content type.
    pub async fn product_photo(&self, id: Uuid) -> Result<Photo, ClientError> {
        let id = id.to_string();
        let response = check(
            self.request(Method::GET, &["product", "product-photo", &id])
                .send()
                .await?,
        )
        .await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = response.bytes().await?.to_vec();

        Ok(Photo { content_type, data })
    }

    /// Products matching the category and price filter
    pub async fn filter_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ClientError> {
        Self::send_data(
            self.request(Method::POST, &["product", "product-filters"])
                .json(filter),
        )
        .await
    }

    /// Number of products in the catalog
    pub async fn product_count(&self) -> Result<i64, ClientError> {
        Ok(Self::send::<CountResponse>(self.request(Method::GET, &["product", "product-count"]))
            .await?
            .total)
    }

    /// One page of the catalog, starting at page 1.
    pub async fn product_page(&self, page: u32) -> Result<Vec<Product>, ClientError> {
        let page = page.to_string();
        Self::send_data(self.request(Method::GET, &["product", "product-list", &page])).await
    }

    /// Products whose name or description contains `keyword`, ignoring case
    pub async fn search(&self, keyword: &str) -> Result<Vec<Product>, ClientError> {
        Self::send(self.request(Method::GET, &["product", "search", keyword])).await
    }

    /// Other products of the same category.
    pub async fn related_products(
        &self,
        product_id: Uuid,
        category_id: Uuid,
    ) -> Result<Vec<Product>, ClientError> {
        let (pid, cid) = (product_id.to_string(), category_id.to_string());
        Self::send_data(self.request(Method::GET, &["product", "related-product", &pid, &cid])).await
    }

    /// A category with its products
    pub async fn products_by_category(&self, slug: &str) -> Result<CategoryProducts, ClientError> {
        Self::send(self.request(Method::GET, &["product", "product-category", slug])).await
    }

    /// Creates a product (admin).
    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, ClientError> {
        Self::send_data(
            self.request(Method::POST, &["product", "create-product"])
                .multipart(product_form(form)?),
        )
        .await
    }

    /// Updates a product (admin); the photo is kept unless the form has one.
    pub async fn update_product(&self, id: Uuid, form: &ProductForm) -> Result<Product, ClientError> {
        let id = id.to_string();
        Self::send_data(
            self.request(Method::PUT, &["product", "update-product", &id])
                .multipart(product_form(form)?),
        )
        .await
    }

    /// Deletes a product (admin).
    pub async fn delete_product(&self, id: Uuid) -> Result<MessageResponse, ClientError> {
        let id = id.to_string();
        Self::send(self.request(Method::DELETE, &["product", "delete-product", &id])).await
    }

    // Checkout

    /// Token for the payment drop-in UI.
    pub async fn braintree_token(&self) -> Result<String, ClientError> {
        Ok(
            Self::send::<ClientTokenResponse>(self.request(Method::GET, &["product", "braintree", "token"]))
                .await?
                .client_token,
        )
    }

    /// Pays for the cart with a payment method nonce.
    ///
    /// The cart is left untouched; clear it once this succeeds.
    pub async fn checkout(&self, nonce: &str, cart: &Cart) -> Result<(), ClientError> {
        Self::send::<AuthCheck>(
            self.request(Method::POST, &["product", "braintree", "payment"])
                .json(&json!({ "nonce": nonce, "cart": cart.to_json() })),
        )
        .await?;
        Ok(())
    }
}

/// Passes success responses through; turns anything else into `ClientError::Api`.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    tracing::debug!(status = status.as_u16(), %message, "API request rejected");

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

fn product_form(form: &ProductForm) -> Result<multipart::Form, ClientError> {
    let mut body = multipart::Form::new()
        .text("name", form.name.clone())
        .text("description", form.description.clone())
        .text("price", form.price.to_string())
        .text("category", form.category.to_string())
        .text("quantity", form.quantity.to_string());

    if let Some(shipping) = form.shipping {
        body = body.text("shipping", if shipping { "1" } else { "0" });
    }

    if let Some(photo) = &form.photo {
        let part = multipart::Part::bytes(photo.data.clone())
            .file_name("photo")
            .mime_str(&photo.content_type)?;
        body = body.part("photo", part);
    }

    Ok(body)
}
