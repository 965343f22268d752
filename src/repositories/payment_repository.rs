use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::payment::{Payment, PaymentChanges};
use crate::repositories::RepositoryError;
use crate::validation::parse_amount;

/// Trait defining payment repository operations
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find a payment by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, RepositoryError>;

    /// Insert a payment; an unknown concept is a constraint violation
    async fn create(&self, payment: Payment) -> Result<Payment, RepositoryError>;

    /// Apply the given changes in a single statement
    async fn update(&self, id: &str, changes: &PaymentChanges) -> Result<(), RepositoryError>;

    /// Delete a payment by ID
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: String,
    concept_id: String,
    amount: String,
    paid_at: NaiveDate,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = RepositoryError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let amount = parse_amount(&row.amount).ok_or_else(|| {
            RepositoryError::DatabaseError(format!(
                "payment {} has a malformed amount '{}'",
                row.id, row.amount
            ))
        })?;

        Ok(Payment {
            id: row.id,
            concept_id: row.concept_id,
            amount,
            date: row.paid_at,
        })
    }
}

/// All payments, most recent date first, ties broken by id descending
pub(crate) async fn select_all<'e, E>(executor: E) -> Result<Vec<Payment>, RepositoryError>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT id, concept_id, amount, paid_at
        FROM payments
        ORDER BY paid_at DESC, id DESC
        "#,
    )
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(Payment::try_from).collect()
}

/// SQLite implementation of PaymentRepository
pub struct SqlitePaymentRepository {
    pool: SqlitePool,
}

impl SqlitePaymentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for SqlitePaymentRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, concept_id, amount, paid_at
            FROM payments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Payment::try_from).transpose()
    }

    async fn create(&self, payment: Payment) -> Result<Payment, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, concept_id, amount, paid_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.concept_id)
        .bind(payment.amount.to_string())
        .bind(payment.date)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "concept not found"))?;

        Ok(payment)
    }

    async fn update(&self, id: &str, changes: &PaymentChanges) -> Result<(), RepositoryError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE payments SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(amount) = &changes.amount {
                fields.push("amount = ");
                fields.push_bind_unseparated(amount.to_string());
            }
            if let Some(date) = changes.date {
                fields.push("paid_at = ");
                fields.push_bind_unseparated(date);
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id.to_string());

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_sqlx(e, "payment violates a data constraint"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("payment"));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound("payment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    async fn setup() -> SqlitePaymentRepository {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        sqlx::query("INSERT INTO concepts (id, title, amount, category_id) VALUES ('c1', 'Luz', '40', 'general')")
            .execute(&pool)
            .await
            .unwrap();
        SqlitePaymentRepository::new(pool)
    }

    fn payment(id: &str, concept_id: &str, date: &str) -> Payment {
        Payment {
            id: id.to_string(),
            concept_id: concept_id.to_string(),
            amount: Decimal::from_str("12.5").unwrap(),
            date: NaiveDate::from_str(date).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_payments_ordered_by_date_then_id_descending() {
        let repo = setup().await;
        repo.create(payment("a", "c1", "2024-01-10")).await.unwrap();
        repo.create(payment("b", "c1", "2024-03-01")).await.unwrap();
        repo.create(payment("c", "c1", "2024-01-10")).await.unwrap();

        let ids: Vec<String> = select_all(&repo.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_create_for_unknown_concept_fails() {
        let repo = setup().await;

        let result = repo.create(payment("p1", "ghost", "2024-01-10")).await;
        assert!(matches!(result, Err(RepositoryError::ConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_update_amount_keeps_date() {
        let repo = setup().await;
        repo.create(payment("p1", "c1", "2024-01-10")).await.unwrap();

        let changes = PaymentChanges {
            amount: Some(Decimal::ZERO),
            date: None,
        };
        repo.update("p1", &changes).await.unwrap();

        let found = repo.find_by_id("p1").await.unwrap().unwrap();
        assert_eq!(found.amount, Decimal::ZERO);
        assert_eq!(found.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_payment_is_not_found() {
        let repo = setup().await;

        let result = repo.delete("ghost").await;
        assert!(matches!(result, Err(RepositoryError::NotFound("payment"))));
    }
}
