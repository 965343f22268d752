use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::models::category::Category;
use crate::models::concept::Concept;
use crate::models::payment::Payment;
use crate::repositories::{
    RepositoryError, category_repository, concept_repository, payment_repository,
};

/// Every row of the store as of a single point in time, each list in its
/// listing order
#[derive(Debug, Clone, Default)]
pub struct StoreContents {
    pub categories: Vec<Category>,
    pub concepts: Vec<Concept>,
    pub payments: Vec<Payment>,
}

/// Trait defining whole-store reads
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Read categories, concepts and payments from one consistent snapshot
    async fn snapshot(&self) -> Result<StoreContents, RepositoryError>;
}

/// SQLite implementation of StateRepository
pub struct SqliteStateRepository {
    pool: SqlitePool,
}

impl SqliteStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateRepository for SqliteStateRepository {
    async fn snapshot(&self) -> Result<StoreContents, RepositoryError> {
        // All three reads share one transaction, so a concurrent cascade or
        // reassignment is either fully visible or not at all
        let mut tx = self.pool.begin().await?;

        let categories = category_repository::select_all(&mut *tx).await?;
        let concepts = concept_repository::select_all(&mut *tx).await?;
        let payments = payment_repository::select_all(&mut *tx).await?;

        tx.commit().await?;

        Ok(StoreContents {
            categories,
            concepts,
            payments,
        })
    }
}
