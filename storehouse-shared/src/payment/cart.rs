/// Validation of the cart submitted at checkout
///
/// The cart arrives as the client's raw JSON. It must be an array of product
/// objects, each carrying its `_id` and a numeric, non-negative `price`.
/// The charge amount is the sum of those prices.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use storehouse_shared::payment::cart::{cart_total, validate_cart};
///
/// let cart = json!([
///     {"_id": "0b6f5c1e-8a55-4c1a-9f0e-2f1a1f4f6b10", "name": "Lamp", "price": 20.0},
///     {"_id": "0b6f5c1e-8a55-4c1a-9f0e-2f1a1f4f6b10", "name": "Lamp", "price": 20.0},
/// ]);
///
/// let items = validate_cart(&cart).unwrap();
/// assert_eq!(cart_total(&items), 40.0);
/// ```

use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Cart rejection reasons
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The cart is not a JSON array
    #[error("Invalid cart data")]
    InvalidCartData,

    /// An entry is not a product object with an ID and a usable price
    #[error("Invalid cart item")]
    InvalidCartItem,
}

/// Validated cart line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartItem {
    pub product_id: Uuid,
    pub price: f64,
}

/// Validates a submitted cart
///
/// # Errors
///
/// - `CartError::InvalidCartData` when `cart` is not an array
/// - `CartError::InvalidCartItem` for the first entry that is not an object,
///   lacks a UUID `_id`, or has a missing, non-numeric or negative `price`,
///   and when the prices add up to more than an `f64` can hold
pub fn validate_cart(cart: &JsonValue) -> Result<Vec<CartItem>, CartError> {
    let entries = cart.as_array().ok_or(CartError::InvalidCartData)?;

    let items = entries
        .iter()
        .map(validate_item)
        .collect::<Result<Vec<_>, _>>()?;

    if !cart_total(&items).is_finite() {
        return Err(CartError::InvalidCartItem);
    }

    Ok(items)
}

fn validate_item(entry: &JsonValue) -> Result<CartItem, CartError> {
    let object = entry.as_object().ok_or(CartError::InvalidCartItem)?;

    let price = object
        .get("price")
        .and_then(JsonValue::as_f64)
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or(CartError::InvalidCartItem)?;

    let product_id = object
        .get("_id")
        .and_then(JsonValue::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or(CartError::InvalidCartItem)?;

    Ok(CartItem { product_id, price })
}

/// Sum of item prices; an empty cart totals zero
pub fn cart_total(items: &[CartItem]) -> f64 {
    items.iter().map(|item| item.price).sum()
}
