/// Product catalog endpoints
///
/// Create and update take `multipart/form-data` with the text fields `name`,
/// `description`, `price`, `category` (category ID), `quantity`, optional
/// `shipping` and an optional `photo` file. Everything else is JSON.
///
/// Photos are never part of product JSON; `hasPhoto` tells the client
/// whether `/product-photo/:pid` will answer.

use super::parse_id;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use storehouse_shared::{
    models::{
        category::Category,
        product::{
            Product, ProductFilter, ProductInput, ProductPhoto, LATEST_LIMIT, MAX_PHOTO_BYTES,
            PAGE_SIZE, RELATED_LIMIT,
        },
    },
    slug::slugify,
};
use uuid::Uuid;

/// Raw multipart fields of a product form
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub quantity: String,
    pub shipping: Option<String>,
    pub photo: Option<ProductPhoto>,
}

impl ProductForm {
    /// Reads every part of the form
    ///
    /// Unknown parts are skipped. An empty `photo` part (no file chosen) is
    /// treated as no photo.
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "photo" {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;
                if !data.is_empty() {
                    form.photo = Some(ProductPhoto {
                        data: data.to_vec(),
                        content_type,
                    });
                }
                continue;
            }

            let value = field.text().await?;
            match name.as_str() {
                "name" => form.name = value,
                "description" => form.description = value,
                "price" => form.price = value,
                "category" => form.category = value,
                "quantity" => form.quantity = value,
                "shipping" => form.shipping = Some(value),
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validates the form in field order and builds the model input
    ///
    /// # Errors
    ///
    /// `400 Bad Request` with `"<Field> is Required"` for the first missing
    /// field, or the reason a value is unusable.
    pub fn into_input(self) -> ApiResult<ProductInput> {
        let required = |value: &str, field: &str| {
            if value.trim().is_empty() {
                Err(ApiError::BadRequest(format!("{} is Required", field)))
            } else {
                Ok(())
            }
        };

        required(&self.name, "Name")?;
        required(&self.description, "Description")?;
        required(&self.price, "Price")?;
        required(&self.category, "Category")?;
        required(&self.quantity, "Quantity")?;

        if let Some(photo) = &self.photo {
            if photo.data.len() > MAX_PHOTO_BYTES {
                return Err(ApiError::BadRequest("Photo should be less than 1MB".to_string()));
            }
        }

        let name = self.name.trim().to_string();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(ApiError::BadRequest("Name is Required".to_string()));
        }

        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| ApiError::BadRequest("Price must be a non-negative number".to_string()))?;

        let quantity = self
            .quantity
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|q| *q >= 0)
            .ok_or_else(|| {
                ApiError::BadRequest("Quantity must be a non-negative integer".to_string())
            })?;

        let category_id = Uuid::parse_str(self.category.trim())
            .map_err(|_| ApiError::BadRequest("Invalid category".to_string()))?;

        let shipping = match self.shipping.as_deref().map(str::trim) {
            None | Some("") => None,
            Some("1") | Some("true") | Some("yes") => Some(true),
            Some("0") | Some("false") | Some("no") => Some(false),
            Some(_) => return Err(ApiError::BadRequest("Invalid shipping value".to_string())),
        };

        Ok(ProductInput {
            name,
            slug,
            description: self.description,
            price,
            quantity,
            category_id,
            shipping,
            photo: self.photo,
        })
    }
}

async fn ensure_category_exists(state: &AppState, category_id: Uuid) -> ApiResult<()> {
    if Category::find_by_id(&state.db, category_id).await?.is_none() {
        return Err(ApiError::BadRequest("Invalid category".to_string()));
    }
    Ok(())
}

/// Create a product (admin)
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input = ProductForm::read(multipart).await?.into_input()?;
    ensure_category_exists(&state, input.category_id).await?;

    let product = Product::create(&state.db, input).await?;
    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product Created Successfully",
            "products": product,
        })),
    ))
}

/// Update a product (admin); the photo is kept unless a new one is sent
pub async fn update_product(
    State(state): State<AppState>,
    Path(pid): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let input = ProductForm::read(multipart).await?.into_input()?;
    let pid = parse_id(&pid, "Product not found")?;
    ensure_category_exists(&state, input.category_id).await?;

    let product = Product::update(&state.db, pid, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Product Updated Successfully",
        "products": product,
    })))
}

/// Delete a product (admin)
///
/// Products that appear on an order are kept: `409 "Product has been ordered"`.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> ApiResult<Json<Value>> {
    let pid = parse_id(&pid, "Product not found")?;

    if !Product::delete(&state.db, pid).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    tracing::info!(product_id = %pid, "Product deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Product Deleted successfully",
    })))
}

/// Newest products
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let products = Product::list_latest(&state.db, LATEST_LIMIT).await?;

    Ok(Json(json!({
        "success": true,
        "countTotal": products.len(),
        "message": "All Products",
        "products": products,
    })))
}

/// One product by slug
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    let product = Product::find_by_slug(&state.db, &slug.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Single Product Fetched",
        "product": product,
    })))
}

/// Raw photo bytes with their stored content type
pub async fn product_photo(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> ApiResult<Response> {
    let pid = parse_id(&pid, "Photo not found")?;

    let photo = Product::find_photo(&state.db, pid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, photo.content_type)], photo.data).into_response())
}

/// Catalog filter request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FilterRequest {
    /// Category IDs; empty means any category
    pub checked: Vec<String>,

    /// `[min, max]`; empty means any price
    pub radio: Vec<f64>,
}

impl FilterRequest {
    pub fn into_filter(self) -> ApiResult<ProductFilter> {
        let category_ids = self
            .checked
            .iter()
            .map(|id| Uuid::parse_str(id))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ApiError::BadRequest("Invalid category id".to_string()))?;

        let price_range = match self.radio.as_slice() {
            [] => None,
            [min, max] => Some((*min, *max)),
            _ => {
                return Err(ApiError::BadRequest(
                    "Price range must be [min, max]".to_string(),
                ))
            }
        };

        Ok(ProductFilter {
            category_ids,
            price_range,
        })
    }
}

/// Products by category and price range
pub async fn filter_products(
    State(state): State<AppState>,
    Json(req): Json<FilterRequest>,
) -> ApiResult<Json<Value>> {
    let filter = req.into_filter()?;
    let products = Product::filter(&state.db, &filter).await?;

    Ok(Json(json!({
        "success": true,
        "products": products,
    })))
}

/// Number of products
pub async fn product_count(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let total = Product::count(&state.db).await?;

    Ok(Json(json!({
        "success": true,
        "total": total,
    })))
}

/// Page number from the path; anything unparsable is page 1
fn page_number(raw: &str) -> i64 {
    raw.parse::<i64>().ok().filter(|p| *p >= 1).unwrap_or(1)
}

/// One page of products, newest first
pub async fn product_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
) -> ApiResult<Json<Value>> {
    let products = Product::list_page(&state.db, page_number(&page), PAGE_SIZE).await?;

    Ok(Json(json!({
        "success": true,
        "products": products,
    })))
}

/// Case-insensitive search on name and description
pub async fn search_products(
    State(state): State<AppState>,
    Path(keyword): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(Product::search(&state.db, &keyword).await?))
}

/// Up to three other products of the same category
pub async fn related_products(
    State(state): State<AppState>,
    Path((pid, cid)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let pid = parse_id(&pid, "Product not found")?;
    let cid = parse_id(&cid, "Category not found")?;

    let products = Product::related(&state.db, pid, cid, RELATED_LIMIT).await?;

    Ok(Json(json!({
        "success": true,
        "products": products,
    })))
}

/// A category and its products
pub async fn products_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    let category = Category::find_by_slug(&state.db, &slug.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let products = Product::list_by_category(&state.db, category.id).await?;

    Ok(Json(json!({
        "success": true,
        "category": category,
        "products": products,
    })))
}
