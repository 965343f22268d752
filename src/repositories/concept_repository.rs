use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::concept::{Concept, ConceptChanges, NewConcept};
use crate::repositories::RepositoryError;
use crate::validation::parse_amount;

/// Trait defining concept repository operations
#[async_trait]
pub trait ConceptRepository: Send + Sync {
    /// Find a concept by ID (without payments)
    async fn find_by_id(&self, id: &str) -> Result<Option<Concept>, RepositoryError>;

    /// Insert a new concept
    async fn create(&self, concept: NewConcept) -> Result<Concept, RepositoryError>;

    /// Apply the given changes in a single statement
    async fn update(&self, id: &str, changes: &ConceptChanges) -> Result<(), RepositoryError>;

    /// Remove the concept and all of its payments in one transaction.
    /// Returns how many payments were removed.
    async fn delete_cascading(&self, id: &str) -> Result<u64, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct ConceptRow {
    id: String,
    title: String,
    amount: String,
    introduced_at: Option<NaiveDate>,
    category_id: String,
}

impl TryFrom<ConceptRow> for Concept {
    type Error = RepositoryError;

    fn try_from(row: ConceptRow) -> Result<Self, Self::Error> {
        let amount = parse_amount(&row.amount).ok_or_else(|| {
            RepositoryError::DatabaseError(format!(
                "concept {} has a malformed amount '{}'",
                row.id, row.amount
            ))
        })?;

        Ok(Concept {
            id: row.id,
            title: row.title,
            amount,
            introduced_at: row.introduced_at,
            category_id: row.category_id,
            payments: Vec::new(),
        })
    }
}

/// All concepts, most recently introduced first and undated ones last.
/// Payments are not loaded.
pub(crate) async fn select_all<'e, E>(executor: E) -> Result<Vec<Concept>, RepositoryError>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ConceptRow>(
        r#"
        SELECT id, title, amount, introduced_at, category_id
        FROM concepts
        ORDER BY introduced_at DESC NULLS LAST, title ASC, id ASC
        "#,
    )
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(Concept::try_from).collect()
}

/// SQLite implementation of ConceptRepository
pub struct SqliteConceptRepository {
    pool: SqlitePool,
}

impl SqliteConceptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConceptRepository for SqliteConceptRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Concept>, RepositoryError> {
        let row = sqlx::query_as::<_, ConceptRow>(
            r#"
            SELECT id, title, amount, introduced_at, category_id
            FROM concepts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Concept::try_from).transpose()
    }

    async fn create(&self, concept: NewConcept) -> Result<Concept, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO concepts (id, title, amount, introduced_at, category_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&concept.id)
        .bind(&concept.title)
        .bind(concept.amount.to_string())
        .bind(concept.introduced_at)
        .bind(&concept.category_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "concept violates a data constraint"))?;

        Ok(Concept {
            id: concept.id,
            title: concept.title,
            amount: concept.amount,
            introduced_at: concept.introduced_at,
            category_id: concept.category_id,
            payments: Vec::new(),
        })
    }

    async fn update(&self, id: &str, changes: &ConceptChanges) -> Result<(), RepositoryError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE concepts SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(title) = &changes.title {
                fields.push("title = ");
                fields.push_bind_unseparated(title.clone());
            }
            if let Some(amount) = &changes.amount {
                fields.push("amount = ");
                fields.push_bind_unseparated(amount.to_string());
            }
            if let Some(introduced_at) = changes.introduced_at {
                fields.push("introduced_at = ");
                fields.push_bind_unseparated(introduced_at);
            }
            if let Some(category_id) = &changes.category_id {
                fields.push("category_id = ");
                fields.push_bind_unseparated(category_id.clone());
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id.to_string());

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "concept violates a data constraint"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("concept"));
        }
        Ok(())
    }

    async fn delete_cascading(&self, id: &str) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let removed_payments = sqlx::query(
            r#"
            DELETE FROM payments
            WHERE concept_id = ?
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let deleted = sqlx::query(
            r#"
            DELETE FROM concepts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if deleted == 0 {
            return Err(RepositoryError::NotFound("concept"));
        }

        tx.commit().await?;

        tracing::info!(concept_id = id, removed_payments, "concept deleted");
        Ok(removed_payments)
    }
}
