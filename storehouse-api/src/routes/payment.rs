/// Checkout endpoints
///
/// - `GET  /api/v1/product/braintree/token` - Client token for the drop-in UI
/// - `POST /api/v1/product/braintree/payment` - Charge the cart (sign-in)
///
/// The charge is the sum of the cart's item prices. Every cart item must name
/// an existing product and the caller must still exist before the gateway is
/// contacted. A successful sale is
/// recorded as an order owned by the caller, with the gateway result as its
/// payment record.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use storehouse_shared::{
    auth::middleware::AuthContext,
    models::{
        order::{CreateOrder, Order},
        product::Product,
        user::User,
    },
    payment::{cart::cart_total, validate_cart, SaleRequest},
};
use uuid::Uuid;

/// Client token response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenResponse {
    pub client_token: String,
}

/// Checkout request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutRequest {
    /// Payment method nonce from the drop-in UI
    pub nonce: Option<String>,

    /// Cart as the storefront holds it
    pub cart: Value,
}

/// Issue a gateway client token
pub async fn client_token(State(state): State<AppState>) -> ApiResult<Json<ClientTokenResponse>> {
    let client_token = state.gateway.generate_client_token().await?;

    Ok(Json(ClientTokenResponse { client_token }))
}

/// Charge the cart and record the order
///
/// # Errors
///
/// - `400 Bad Request`: `"Invalid cart data"`, `"Invalid cart item"` (including
///   ids of products that no longer exist), `"Payment nonce is required"`, or
///   the gateway's decline message
/// - `401 Unauthorized`: The caller's account no longer exists
/// - `500 Internal Server Error`: Gateway unreachable or the order could not be saved
pub async fn checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<Json<Value>> {
    let items = validate_cart(&req.cart)?;

    let nonce = req
        .nonce
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Payment nonce is required".to_string()))?;

    if User::find_by_id(&state.db, auth.user_id).await?.is_none() {
        return Err(ApiError::Unauthorized("UnAuthorized Access".to_string()));
    }

    let product_ids: Vec<Uuid> = items.iter().map(|item| item.product_id).collect();
    let missing = Product::missing_ids(&state.db, &product_ids).await?;
    if !missing.is_empty() {
        tracing::info!(
            user_id = %auth.user_id,
            missing = ?missing,
            "Cart references unknown products"
        );
        return Err(ApiError::BadRequest("Invalid cart item".to_string()));
    }

    let amount = cart_total(&items);
    let result = state.gateway.sale(SaleRequest::new(amount, nonce)).await?;

    if !result.success {
        let message = result
            .message
            .unwrap_or_else(|| "Payment declined".to_string());
        tracing::info!(
            user_id = %auth.user_id,
            gateway = state.gateway.name(),
            amount,
            reason = %message,
            "Payment declined"
        );
        return Err(ApiError::PaymentDeclined(message));
    }

    let payment = serde_json::to_value(&result)
        .map_err(|e| ApiError::InternalError(format!("Failed to encode payment result: {}", e)))?;

    let order = Order::create(
        &state.db,
        CreateOrder {
            buyer_id: auth.user_id,
            product_ids,
            payment,
        },
    )
    .await
    .map_err(|e| {
        ApiError::InternalError(format!(
            "Payment captured but order was not saved (transaction {:?}): {}",
            result.transaction.as_ref().map(|t| t.id.as_str()),
            e
        ))
    })?;

    tracing::info!(
        order_id = %order.id,
        user_id = %auth.user_id,
        amount,
        "Order placed"
    );

    Ok(Json(json!({ "ok": true })))
}
