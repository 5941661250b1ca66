//! # Product Repository
//!
//! Database operations for products, plus the two inventory primitives the
//! checkout runs inside its own database transaction.
//!
//! ## Key Operations
//! - CRUD operations (soft delete)
//! - [`lookup`] / [`decrement_stock`]: connection-level inventory access
//!
//! ## Guarded Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, compute, write back                                    │
//! │     SELECT stock ...  → 10                                              │
//! │     UPDATE products SET stock = 8 ...                                   │
//! │     (a concurrent checkout between the two is silently lost)            │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional write                                      │
//! │     UPDATE products SET stock = stock - 2                               │
//! │     WHERE id = ? AND stock >= 2                                         │
//! │                                                                         │
//! │  0 rows affected → someone else took the stock first → abort           │
//! │  Stock can never go below zero, whatever the interleaving.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{CoreError, Product, ProductInput, StockSnapshot};

const PRODUCT_COLUMNS: &str =
    "id, name, price, stock, category_id, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let drinks = repo.list(Some(2)).await?;
/// let product = repo.get_by_id(1).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists active products ordered by id, optionally within one category.
    pub async fn list(&self, category_id: Option<i64>) -> DbResult<Vec<Product>> {
        debug!(?category_id, "Listing products");

        let products = match category_id {
            Some(category_id) => {
                sqlx::query_as::<_, Product>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products \
                     WHERE is_active = 1 AND category_id = ?1 ORDER BY id"
                ))
                .bind(category_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Product>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(products)
    }

    /// Gets an active product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found or soft-deleted
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its assigned id
    /// * `Err(DbError::Domain)` - Input failed validation
    /// * `Err(DbError::ForeignKeyViolation)` - `category_id` doesn't exist
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        let input = input.validated()?;
        debug!(name = %input.name, "Inserting product");

        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, price, stock, category_id, is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Replaces name, price, stock and category of an active product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated product
    /// * `Err(DbError::Domain(ProductNotFound))` - Product doesn't exist or is soft-deleted
    pub async fn update(&self, id: i64, input: &ProductInput) -> DbResult<Product> {
        let input = input.validated()?;
        debug!(id, name = %input.name, "Updating product");

        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET \
                name = ?2, \
                price = ?3, \
                stock = ?4, \
                category_id = ?5, \
                updated_at = ?6 \
             WHERE id = ?1 AND is_active = 1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .bind(input.category_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Soft-deletes a product by setting is_active = 0.
    ///
    /// Transaction details keep pointing at the row, and the product can no
    /// longer be listed, fetched or checked out.
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Soft-deleting product");

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(id).into());
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Inventory Primitives
// =============================================================================

/// Reads the checkout-relevant fields of an active product.
///
/// Runs on the given connection so a checkout sees its own earlier
/// decrements. Returns `None` for unknown and soft-deleted products.
pub async fn lookup(conn: &mut SqliteConnection, product_id: i64) -> DbResult<Option<StockSnapshot>> {
    let snapshot = sqlx::query_as::<_, StockSnapshot>(
        "SELECT id AS product_id, name, price AS unit_price, stock \
         FROM products WHERE id = ?1 AND is_active = 1",
    )
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(snapshot)
}

/// Decrements stock if, and only if, enough is left at write time.
///
/// ## Returns
/// * `Ok(true)` - Stock was decremented
/// * `Ok(false)` - No row matched: stock depleted concurrently (or product
///   deactivated), nothing was changed
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
) -> DbResult<bool> {
    debug!(product_id, quantity, "Decrementing stock");

    let result = sqlx::query(
        "UPDATE products \
         SET stock = stock - ?2, updated_at = ?3 \
         WHERE id = ?1 AND is_active = 1 AND stock >= ?2",
    )
    .bind(product_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, DbError};
    use kasir_core::{CategoryInput, Money};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn input(name: &str, price: i64, stock: i64) -> ProductInput {
        ProductInput {
            name: name.to_string(),
            price: Money::from_minor(price),
            stock,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = setup().await;
        let repo = db.products();

        let created = repo.insert(&input("Indomie Godog", 3500, 10)).await.unwrap();
        assert!(created.id > 0);
        assert!(created.is_active);
        assert_eq!(created.price, Money::from_minor(3500));

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_input() {
        let db = setup().await;

        let err = db.products().insert(&input("", 3500, 10)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = db.products().insert(&input("Kecap", -1, 10)).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_unknown_category() {
        let db = setup().await;

        let mut bad = input("Kecap", 12000, 20);
        bad.category_id = Some(42);

        let err = db.products().insert(&bad).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_filters_by_category() {
        let db = setup().await;
        let food = db
            .categories()
            .insert(&CategoryInput {
                name: "Makanan".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();

        let mut indomie = input("Indomie Godog", 3500, 10);
        indomie.category_id = Some(food.id);
        db.products().insert(&indomie).await.unwrap();
        db.products().insert(&input("Vit 1000ml", 3000, 40)).await.unwrap();

        assert_eq!(db.products().list(None).await.unwrap().len(), 2);

        let in_food = db.products().list(Some(food.id)).await.unwrap();
        assert_eq!(in_food.len(), 1);
        assert_eq!(in_food[0].name, "Indomie Godog");
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let db = setup().await;
        let repo = db.products();
        let created = repo.insert(&input("Kecap", 12000, 20)).await.unwrap();

        let updated = repo
            .update(created.id, &input("Kecap Manis", 13000, 25))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Kecap Manis");
        assert_eq!(updated.price, Money::from_minor(13000));
        assert_eq!(updated.stock, 25);
        assert_eq!(updated.created_at, created.created_at);

        let err = repo.update(999, &input("X", 1, 1)).await.unwrap_err();
        assert_eq!(err.as_domain(), Some(&CoreError::ProductNotFound(999)));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_product() {
        let db = setup().await;
        let repo = db.products();
        let created = repo.insert(&input("Kecap", 12000, 20)).await.unwrap();

        repo.soft_delete(created.id).await.unwrap();

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(repo.list(None).await.unwrap().is_empty());
        let err = repo.soft_delete(created.id).await.unwrap_err();
        assert_eq!(err.as_domain(), Some(&CoreError::ProductNotFound(created.id)));
    }

    #[tokio::test]
    async fn test_lookup_and_decrement() {
        let db = setup().await;
        let created = db.products().insert(&input("Indomie Godog", 3500, 10)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();

        let snapshot = lookup(&mut conn, created.id).await.unwrap().unwrap();
        assert_eq!(snapshot.unit_price, Money::from_minor(3500));
        assert_eq!(snapshot.stock, 10);

        assert!(decrement_stock(&mut conn, created.id, 10).await.unwrap());
        assert!(!decrement_stock(&mut conn, created.id, 1).await.unwrap());

        let snapshot = lookup(&mut conn, created.id).await.unwrap().unwrap();
        assert_eq!(snapshot.stock, 0);

        assert!(lookup(&mut conn, 999).await.unwrap().is_none());
    }
}
