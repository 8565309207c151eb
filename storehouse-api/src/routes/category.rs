/// Category endpoints
///
/// # Endpoints
///
/// - `POST   /api/v1/category/create-category` - Create (admin)
/// - `PUT    /api/v1/category/update-category/:id` - Rename (admin)
/// - `GET    /api/v1/category/get-category` - List
/// - `GET    /api/v1/category/single-category/:slug` - Fetch by slug
/// - `DELETE /api/v1/category/delete-category/:id` - Delete (admin)

use super::parse_id;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use storehouse_shared::{
    models::category::{Category, CategoryInput},
    slug::slugify,
};

/// Create or rename request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryRequest {
    pub name: String,
}

impl CategoryRequest {
    /// Trimmed name and its slug
    fn into_input(self) -> ApiResult<CategoryInput> {
        let name = self.name.trim().to_string();
        let slug = slugify(&name);
        if name.is_empty() || slug.is_empty() {
            return Err(ApiError::BadRequest("Name is required".to_string()));
        }
        Ok(CategoryInput { name, slug })
    }
}

/// Create a category
///
/// # Errors
///
/// - `400 Bad Request`: Name missing
/// - `409 Conflict`: A category with this name exists
pub async fn create_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let input = req.into_input()?;

    if Category::find_by_name(&state.db, &input.name).await?.is_some() {
        return Err(ApiError::Conflict("Category already exists".to_string()));
    }

    let category = Category::create(&state.db, input).await?;
    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "New category created",
            "category": category,
        })),
    ))
}

/// Rename a category
///
/// # Errors
///
/// - `400 Bad Request`: Name missing
/// - `404 Not Found`: Unknown category
/// - `409 Conflict`: Another category has this name
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CategoryRequest>,
) -> ApiResult<Json<Value>> {
    let input = req.into_input()?;
    let id = parse_id(&id, "Category not found")?;

    let category = Category::update(&state.db, id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Category Updated Successfully",
        "category": category,
    })))
}

/// Every category
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let categories = Category::list_all(&state.db).await?;

    Ok(Json(json!({
        "success": true,
        "message": "All Categories List",
        "category": categories,
    })))
}

/// One category by slug
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Json<Value>> {
    let category = Category::find_by_slug(&state.db, &slug.to_lowercase())
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Get Single Category Successfully",
        "category": category,
    })))
}

/// Delete a category that no product uses
///
/// # Errors
///
/// - `404 Not Found`: Unknown category
/// - `409 Conflict`: Products still reference it
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "Category not found")?;

    if !Category::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    tracing::info!(category_id = %id, "Category deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Category Deleted Successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_is_trimmed_and_slugged() {
        let input = CategoryRequest {
            name: "  Home & Garden ".to_string(),
        }
        .into_input()
        .unwrap();
        assert_eq!(input.name, "Home & Garden");
        assert_eq!(input.slug, "home-garden");
    }

    #[test]
    fn test_blank_name_rejected() {
        for name in ["", "   ", "!!!"] {
            let err = CategoryRequest {
                name: name.to_string(),
            }
            .into_input()
            .unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(msg) if msg == "Name is required"));
        }
    }
}
