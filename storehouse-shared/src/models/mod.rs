/// Database models for Storehouse
///
/// Each model owns its SQL. Functions take a `&PgPool` and return
/// `sqlx::Error` untouched so callers decide how failures surface.
///
/// # Models
///
/// - `user`: Customer and admin accounts
/// - `category`: Product categories
/// - `product`: Catalog products, photo storage and catalog queries
/// - `order`: Paid orders with their product lines and status
///
/// # Example
///
/// ```no_run
/// use storehouse_shared::models::category::{Category, CategoryInput};
/// use storehouse_shared::slug::slugify;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let category = Category::create(
///     &pool,
///     CategoryInput {
///         name: "Garden Tools".to_string(),
///         slug: slugify("Garden Tools"),
///     },
/// )
/// .await?;
/// assert_eq!(category.slug, "garden-tools");
/// # Ok(())
/// # }
/// ```

pub mod category;
pub mod order;
pub mod product;
pub mod user;
