//! # Category Repository
//!
//! CRUD for product categories. Category names are unique; deleting a
//! category detaches its products (`ON DELETE SET NULL`).

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use kasir_core::{Category, CategoryInput, CoreError};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - A category with this name exists
    pub async fn insert(&self, input: &CategoryInput) -> DbResult<Category> {
        let input = input.validated()?;
        debug!(name = %input.name, "Inserting category");

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, description) VALUES (?1, ?2) \
             RETURNING id, name, description",
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| with_name(e.into(), &input.name))?;

        Ok(category)
    }

    /// Replaces name and description of a category.
    pub async fn update(&self, id: i64, input: &CategoryInput) -> DbResult<Category> {
        let input = input.validated()?;
        debug!(id, name = %input.name, "Updating category");

        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = ?2, description = ?3 WHERE id = ?1 \
             RETURNING id, name, description",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| with_name(e.into(), &input.name))?;

        category.ok_or_else(|| CoreError::CategoryNotFound(id).into())
    }

    /// Deletes a category. Its products stay, with `category_id` cleared.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::CategoryNotFound(id).into());
        }

        Ok(())
    }
}

/// Fills in the offending value of a unique violation on `name`.
fn with_name(err: DbError, name: &str) -> DbError {
    match err {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
        other => other,
    }
}
