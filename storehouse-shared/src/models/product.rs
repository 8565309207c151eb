/// Product model and catalog queries
///
/// Products always come back with their category joined in. The photo bytes
/// stay in the database and are only read by [`Product::find_photo`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     slug VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
///     quantity INTEGER NOT NULL CHECK (quantity >= 0),
///     category_id UUID NOT NULL REFERENCES categories (id) ON DELETE RESTRICT,
///     photo BYTEA,
///     photo_content_type VARCHAR(255),
///     shipping BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Number of products on the home listing
pub const LATEST_LIMIT: i64 = 12;

/// Products per page for paginated listing
pub const PAGE_SIZE: i64 = 6;

/// Maximum number of related products
pub const RELATED_LIMIT: i64 = 3;

/// Maximum accepted photo size in bytes
pub const MAX_PHOTO_BYTES: usize = 1_000_000;

/// Category fields embedded in a product
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Catalog product without its photo
#[derive(Debug, Clone, Serialize)]
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
    /// Whether a photo can be fetched for this product
    pub has_photo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape of [`PRODUCT_COLUMNS`]
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    price: f64,
    quantity: i32,
    category_id: Uuid,
    category_name: String,
    category_slug: String,
    shipping: bool,
    has_photo: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: row.price,
            quantity: row.quantity,
            category: CategorySummary {
                id: row.category_id,
                name: row.category_name,
                slug: row.category_slug,
            },
            shipping: row.shipping,
            has_photo: row.has_photo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Columns selected for [`ProductRow`]; expects `products p JOIN categories c`
pub(crate) const PRODUCT_COLUMNS: &str = "p.id, p.name, p.slug, p.description, p.price, \
     p.quantity, p.category_id, c.name AS category_name, c.slug AS category_slug, \
     p.shipping, (p.photo IS NOT NULL) AS has_photo, p.created_at, p.updated_at";

/// Uploaded product photo
#[derive(Clone)]
pub struct ProductPhoto {
    pub data: Vec<u8>,
    pub content_type: String,
}

impl std::fmt::Debug for ProductPhoto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductPhoto")
            .field("bytes", &self.data.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Input for creating or updating a product
///
/// On update, `shipping` and `photo` keep the stored value when `None`.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub category_id: Uuid,
    pub shipping: Option<bool>,
    pub photo: Option<ProductPhoto>,
}

/// Catalog filter; empty parts impose no constraint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Match any of these categories
    pub category_ids: Vec<Uuid>,

    /// Inclusive `(min, max)` price bounds
    pub price_range: Option<(f64, f64)>,
}

/// Escapes `LIKE` metacharacters so user input matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Row offset for a 1-based page number; page 0 is read as page 1
pub fn page_offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1) * per_page
}

fn into_products(rows: Vec<ProductRow>) -> Vec<Product> {
    rows.into_iter().map(Product::from).collect()
}

impl Product {
    /// Creates a product
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation when the category does not exist.
    pub async fn create(pool: &PgPool, data: ProductInput) -> Result<Self, sqlx::Error> {
        let (photo, content_type) = match data.photo {
            Some(photo) => (Some(photo.data), Some(photo.content_type)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            WITH p AS (
                INSERT INTO products
                    (name, slug, description, price, quantity, category_id, shipping,
                     photo, photo_content_type)
                VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, FALSE), $8, $9)
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS}
            FROM p JOIN categories c ON c.id = p.category_id
            "#
        ))
        .bind(data.name)
        .bind(data.slug)
        .bind(data.description)
        .bind(data.price)
        .bind(data.quantity)
        .bind(data.category_id)
        .bind(data.shipping)
        .bind(photo)
        .bind(content_type)
        .fetch_one(pool)
        .await?;

        Ok(row.into())
    }

    /// Updates a product, replacing the photo only when a new one is given
    ///
    /// Returns `None` when no product has this ID.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: ProductInput,
    ) -> Result<Option<Self>, sqlx::Error> {
        let (photo, content_type) = match data.photo {
            Some(photo) => (Some(photo.data), Some(photo.content_type)),
            None => (None, None),
        };

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            WITH p AS (
                UPDATE products
                SET name = $2,
                    slug = $3,
                    description = $4,
                    price = $5,
                    quantity = $6,
                    category_id = $7,
                    shipping = COALESCE($8, shipping),
                    photo = COALESCE($9, photo),
                    photo_content_type = COALESCE($10, photo_content_type),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {PRODUCT_COLUMNS}
            FROM p JOIN categories c ON c.id = p.category_id
            "#
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.slug)
        .bind(data.description)
        .bind(data.price)
        .bind(data.quantity)
        .bind(data.category_id)
        .bind(data.shipping)
        .bind(photo)
        .bind(content_type)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Deletes a product
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Returns the ids from `ids` that match no product, deduplicated
    pub async fn missing_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>, sqlx::Error> {
        let mut wanted = ids.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let found: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM products WHERE id = ANY($1)")
            .bind(&wanted)
            .fetch_all(pool)
            .await?;

        Ok(wanted.into_iter().filter(|id| !found.contains(id)).collect())
    }

    /// Finds a product by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id \
             WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Finds a product by slug
    ///
    /// Slugs are not unique; the newest match wins.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id \
             WHERE p.slug = $1 ORDER BY p.created_at DESC LIMIT 1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Loads the photo of a product, if it has one
    pub async fn find_photo(pool: &PgPool, id: Uuid) -> Result<Option<ProductPhoto>, sqlx::Error> {
        let row: Option<(Vec<u8>, Option<String>)> = sqlx::query_as(
            "SELECT photo, photo_content_type FROM products WHERE id = $1 AND photo IS NOT NULL",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(data, content_type)| ProductPhoto {
            data,
            content_type: content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        }))
    }

    /// Newest products, at most `limit`
    pub async fn list_latest(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id \
             ORDER BY p.created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(into_products(rows))
    }

    /// Total number of products
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await
    }

    /// One page of products, newest first
    pub async fn list_page(pool: &PgPool, page: i64, per_page: i64) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id \
             ORDER BY p.created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(per_page)
        .bind(page_offset(page, per_page))
        .fetch_all(pool)
        .await?;

        Ok(into_products(rows))
    }

    /// Products matching a category and price filter
    pub async fn filter(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Self>, sqlx::Error> {
        let (min, max) = match filter.price_range {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p JOIN categories c ON c.id = p.category_id
            WHERE (cardinality($1::uuid[]) = 0 OR p.category_id = ANY($1))
              AND ($2::float8 IS NULL OR p.price >= $2)
              AND ($3::float8 IS NULL OR p.price <= $3)
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(&filter.category_ids)
        .bind(min)
        .bind(max)
        .fetch_all(pool)
        .await?;

        Ok(into_products(rows))
    }

    /// Case-insensitive substring search over name and description
    pub async fn search(pool: &PgPool, keyword: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(keyword));

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products p JOIN categories c ON c.id = p.category_id
            WHERE p.name ILIKE $1 ESCAPE '\' OR p.description ILIKE $1 ESCAPE '\'
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(into_products(rows))
    }

    /// Other products of the same category
    pub async fn related(
        pool: &PgPool,
        product_id: Uuid,
        category_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id \
             WHERE p.category_id = $1 AND p.id <> $2 ORDER BY p.created_at DESC LIMIT $3"
        ))
        .bind(category_id)
        .bind(product_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(into_products(rows))
    }

    /// All products in a category, newest first
    pub async fn list_by_category(pool: &PgPool, category_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id \
             WHERE p.category_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(category_id)
        .fetch_all(pool)
        .await?;

        Ok(into_products(rows))
    }
}
