/// Order model and database operations
///
/// An order records the products of a paid cart (in cart order, duplicates
/// allowed), the gateway's payment result and a fulfilment status.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE order_status AS ENUM
///     ('Not Process', 'Processing', 'Shipped', 'Delivered', 'Cancelled');
///
/// CREATE TABLE orders (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     buyer_id UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     payment JSONB NOT NULL DEFAULT '{}'::jsonb,
///     status order_status NOT NULL DEFAULT 'Not Process',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE order_products (
///     order_id UUID NOT NULL REFERENCES orders (id) ON DELETE CASCADE,
///     position INTEGER NOT NULL,
///     product_id UUID NOT NULL REFERENCES products (id) ON DELETE RESTRICT,
///     PRIMARY KEY (order_id, position)
/// );
/// ```

use super::product::{Product, ProductRow, PRODUCT_COLUMNS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order fulfilment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "Not Process")]
    #[sqlx(rename = "Not Process")]
    NotProcess,

    #[serde(rename = "Processing")]
    #[sqlx(rename = "Processing")]
    Processing,

    #[serde(rename = "Shipped")]
    #[sqlx(rename = "Shipped")]
    Shipped,

    #[serde(rename = "Delivered")]
    #[sqlx(rename = "Delivered")]
    Delivered,

    #[serde(rename = "Cancelled")]
    #[sqlx(rename = "Cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::NotProcess,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Canonical label
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::NotProcess => "Not Process",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown status label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid order status: {0}")]
pub struct InvalidOrderStatus(pub String);

impl FromStr for OrderStatus {
    type Err = InvalidOrderStatus;

    /// Parses a canonical label; the legacy spellings `deliverd` and
    /// `cancel` are still accepted from older admin clients.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Process" => Ok(OrderStatus::NotProcess),
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" | "deliverd" => Ok(OrderStatus::Delivered),
            "Cancelled" | "cancel" => Ok(OrderStatus::Cancelled),
            other => Err(InvalidOrderStatus(other.to_string())),
        }
    }
}

/// Stored order row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "buyer")]
    pub buyer_id: Uuid,
    pub payment: JsonValue,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Buyer fields embedded in an order
#[derive(Debug, Clone, Serialize)]
pub struct BuyerSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

/// Order with its products and buyer resolved
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub products: Vec<Product>,
    pub payment: JsonValue,
    pub buyer: BuyerSummary,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for recording a paid order
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub buyer_id: Uuid,
    /// Product IDs in cart order
    pub product_ids: Vec<Uuid>,
    /// Gateway result, stored as-is
    pub payment: JsonValue,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderHeaderRow {
    id: Uuid,
    buyer_id: Uuid,
    buyer_name: String,
    payment: JsonValue,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderProductRow {
    order_id: Uuid,
    #[sqlx(flatten)]
    product: ProductRow,
}

const ORDER_HEADER_COLUMNS: &str = "o.id, o.buyer_id, u.name AS buyer_name, o.payment, \
     o.status, o.created_at, o.updated_at";

impl Order {
    /// Records an order and its product lines in one transaction
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation when the buyer or a product does not exist.
    pub async fn create(pool: &PgPool, data: CreateOrder) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (buyer_id, payment)
            VALUES ($1, $2)
            RETURNING id, buyer_id, payment, status, created_at, updated_at
            "#,
        )
        .bind(data.buyer_id)
        .bind(&data.payment)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO order_products (order_id, position, product_id)
            SELECT $1, (t.ord - 1)::INTEGER, t.product_id
            FROM UNNEST($2::uuid[]) WITH ORDINALITY AS t(product_id, ord)
            "#,
        )
        .bind(order.id)
        .bind(&data.product_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            order_id = %order.id,
            buyer_id = %order.buyer_id,
            products = data.product_ids.len(),
            "Order recorded"
        );

        Ok(order)
    }

    /// Finds a stored order by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            "SELECT id, buyer_id, payment, status, created_at, updated_at FROM orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Orders placed by one buyer, newest first
    pub async fn list_by_buyer(pool: &PgPool, buyer_id: Uuid) -> Result<Vec<OrderDetail>, sqlx::Error> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "SELECT {ORDER_HEADER_COLUMNS} FROM orders o JOIN users u ON u.id = o.buyer_id \
             WHERE o.buyer_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(buyer_id)
        .fetch_all(pool)
        .await?;

        Self::resolve(pool, headers).await
    }

    /// Every order, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<OrderDetail>, sqlx::Error> {
        let headers = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            "SELECT {ORDER_HEADER_COLUMNS} FROM orders o JOIN users u ON u.id = o.buyer_id \
             ORDER BY o.created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Self::resolve(pool, headers).await
    }

    /// Changes the status of an order
    ///
    /// Returns `None` when no order has this ID.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderDetail>, sqlx::Error> {
        let header = sqlx::query_as::<_, OrderHeaderRow>(&format!(
            r#"
            WITH o AS (
                UPDATE orders SET status = $2, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {ORDER_HEADER_COLUMNS} FROM o JOIN users u ON u.id = o.buyer_id
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        match header {
            Some(header) => Ok(Self::resolve(pool, vec![header]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Loads product lines for a batch of orders
    async fn resolve(
        pool: &PgPool,
        headers: Vec<OrderHeaderRow>,
    ) -> Result<Vec<OrderDetail>, sqlx::Error> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();

        let lines = sqlx::query_as::<_, OrderProductRow>(&format!(
            r#"
            SELECT op.order_id, {PRODUCT_COLUMNS}
            FROM order_products op
            JOIN products p ON p.id = op.product_id
            JOIN categories c ON c.id = p.category_id
            WHERE op.order_id = ANY($1)
            ORDER BY op.order_id, op.position
            "#
        ))
        .bind(&order_ids)
        .fetch_all(pool)
        .await?;

        let mut products: HashMap<Uuid, Vec<Product>> = HashMap::new();
        for line in lines {
            products
                .entry(line.order_id)
                .or_default()
                .push(line.product.into());
        }

        Ok(headers
            .into_iter()
            .map(|h| OrderDetail {
                id: h.id,
                products: products.remove(&h.id).unwrap_or_default(),
                payment: h.payment,
                buyer: BuyerSummary {
                    id: h.buyer_id,
                    name: h.buyer_name,
                },
                status: h.status,
                created_at: h.created_at,
                updated_at: h.updated_at,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.to_string())
            );
        }
    }

    #[test]
    fn test_status_accepts_legacy_spellings() {
        assert_eq!("deliverd".parse::<OrderStatus>(), Ok(OrderStatus::Delivered));
        assert_eq!("cancel".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
    }

    #[test]
    fn test_status_rejects_unknown() {
        let err = "Lost".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, InvalidOrderStatus("Lost".to_string()));
        assert!("processing".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_default_status() {
        assert_eq!(OrderStatus::default(), OrderStatus::NotProcess);
        assert_eq!(OrderStatus::default().to_string(), "Not Process");
    }

    #[test]
    fn test_order_detail_serialization() {
        let buyer_id = Uuid::new_v4();
        let detail = OrderDetail {
            id: Uuid::new_v4(),
            products: Vec::new(),
            payment: serde_json::json!({"success": true}),
            buyer: BuyerSummary {
                id: buyer_id,
                name: "Jane".to_string(),
            },
            status: OrderStatus::Shipped,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["buyer"]["name"], "Jane");
        assert_eq!(json["status"], "Shipped");
        assert_eq!(json["payment"]["success"], true);
        assert!(json["products"].as_array().unwrap().is_empty());
    }
}
