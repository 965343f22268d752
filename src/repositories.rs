pub mod category_repository;
pub mod concept_repository;
pub mod payment_repository;
pub mod state_repository;

pub use category_repository::{CategoryRepository, SqliteCategoryRepository};
pub use concept_repository::{ConceptRepository, SqliteConceptRepository};
pub use payment_repository::{PaymentRepository, SqlitePaymentRepository};
pub use state_repository::{SqliteStateRepository, StateRepository, StoreContents};

/// Repository errors for database operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl RepositoryError {
    /// Classifies an sqlx error, turning key and check violations into
    /// `ConstraintViolation` with the given message
    pub(crate) fn from_sqlx(err: sqlx::Error, violation: &str) -> Self {
        match err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.is_foreign_key_violation()
                    || db_err.is_check_violation() =>
            {
                tracing::debug!(error = %db_err, "constraint violation");
                RepositoryError::ConstraintViolation(violation.to_string())
            }
            other => RepositoryError::DatabaseError(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::DatabaseError(err.to_string())
    }
}
