/// Response payloads of the Storehouse API.
///
/// Field names follow the wire format (`_id`, camelCase).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account as returned by login and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// 0 = customer, 1 = admin
    #[serde(default)]
    pub role: i16,
}

impl AuthUser {
    /// True for role `1`
    pub fn is_admin(&self) -> bool {
        self.role == 1
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub user: AuthUser,
    pub token: String,
}

/// `{success, message}` acknowledgement
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category embedded in a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub category: CategorySummary,
    pub shipping: bool,
    pub has_photo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub products: Vec<Product>,
    pub payment: serde_json::Value,
    pub buyer: BuyerSummary,
    /// `Not Process`, `Processing`, `Shipped`, `Delivered` or `Cancelled`
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    pub answer: String,
}

/// Profile changes; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Photo upload.
#[derive(Debug, Clone)]
pub struct Photo {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Product create/update form.
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Uuid,
    pub quantity: i32,
    pub shipping: Option<bool>,
    pub photo: Option<Photo>,
}

/// Catalog filter; empty fields match everything.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductFilter {
    pub checked: Vec<Uuid>,
    pub radio: Vec<f64>,
}

impl ProductFilter {
    /// Limits prices to `min..=max`
    pub fn price_between(mut self, min: f64, max: f64) -> Self {
        self.radio = vec![min, max];
        self
    }

    /// Adds a category to match
    pub fn in_category(mut self, id: Uuid) -> Self {
        self.checked.push(id);
        self
    }
}

/// A category and its products.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryProducts {
    pub category: Category,
    pub products: Vec<Product>,
}
