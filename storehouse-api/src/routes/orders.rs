/// Order endpoints
///
/// - `GET /api/v1/auth/orders` - The caller's orders
/// - `GET /api/v1/auth/all-orders` - Every order (admin)
/// - `PUT /api/v1/auth/order-status/:orderId` - Change an order's status (admin)
///
/// Orders come back with their products (no photo bytes) and the buyer's
/// name resolved, newest first.

use super::parse_id;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use storehouse_shared::{
    auth::middleware::AuthContext,
    models::order::{Order, OrderDetail, OrderStatus},
};

/// Status change request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Orders placed by the caller
pub async fn list_own_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<OrderDetail>>> {
    Ok(Json(Order::list_by_buyer(&state.db, auth.user_id).await?))
}

/// Every order
pub async fn list_all_orders(State(state): State<AppState>) -> ApiResult<Json<Vec<OrderDetail>>> {
    Ok(Json(Order::list_all(&state.db).await?))
}

/// Change the status of an order
///
/// # Errors
///
/// - `400 Bad Request`: Status is not one of the order states
/// - `404 Not Found`: Unknown order
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<OrderDetail>> {
    let status: OrderStatus = req.status.parse()?;
    let order_id = parse_id(&order_id, "Order not found")?;

    let order = Order::update_status(&state.db, order_id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");

    Ok(Json(order))
}
