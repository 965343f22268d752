use async_trait::async_trait;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::models::category::Category;
use crate::repositories::RepositoryError;

/// Trait defining category repository operations
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category by its slug
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, RepositoryError>;

    /// Insert a new category; a taken id is a constraint violation
    async fn create(&self, category: Category) -> Result<Category, RepositoryError>;

    /// Change the display name of an existing category
    async fn rename(&self, id: &str, name: &str) -> Result<(), RepositoryError>;

    /// Move every concept of `id` to `fallback_id` and remove `id`, in one
    /// transaction. Returns how many concepts were moved.
    async fn delete_reassigning(&self, id: &str, fallback_id: &str)
    -> Result<u64, RepositoryError>;
}

/// All categories ordered by name
pub(crate) async fn select_all<'e, E>(executor: E) -> Result<Vec<Category>, RepositoryError>
where
    E: SqliteExecutor<'e>,
{
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, color
        FROM categories
        ORDER BY name COLLATE NOCASE ASC, id ASC
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(categories)
}

/// SQLite implementation of CategoryRepository
pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, color
            FROM categories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn create(&self, category: Category) -> Result<Category, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO categories (id, name, color)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.color)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_sqlx(e, "a category with that name already exists")
        })?;

        Ok(category)
    }

    async fn rename(&self, id: &str, name: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = ?
            WHERE id = ?
            "#,
        )
        .bind(name)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("category"));
        }
        Ok(())
    }

    async fn delete_reassigning(
        &self,
        id: &str,
        fallback_id: &str,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let moved = sqlx::query(
            r#"
            UPDATE concepts
            SET category_id = ?
            WHERE category_id = ?
            "#,
        )
        .bind(fallback_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "fallback category is missing"))?
        .rows_affected();

        let deleted = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "category is still referenced"))?
        .rows_affected();

        // Dropping the transaction rolls back the reassignment
        if deleted == 0 {
            return Err(RepositoryError::NotFound("category"));
        }

        tx.commit().await?;

        tracing::info!(category_id = id, moved, "category deleted");
        Ok(moved)
    }
}
