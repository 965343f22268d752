use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::payment::{CreatePaymentRequest, Payment, PaymentChanges, UpdatePaymentRequest};
use crate::repositories::{ConceptRepository, PaymentRepository, RepositoryError};
use crate::validation::{parse_day, validate_non_negative_amount};

/// Payment service errors
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("conceptId is required")]
    ConceptRequired,

    #[error("amount must be a non-negative number")]
    InvalidAmount,

    #[error("'{0}' is not a valid YYYY-MM-DD date")]
    InvalidDate(String),

    #[error("concept not found")]
    ConceptNotFound,

    #[error("payment not found")]
    PaymentNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Trait defining payment service operations
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Record a payment against an existing concept; the day defaults to today (UTC)
    async fn create_payment(&self, request: CreatePaymentRequest)
    -> Result<Payment, PaymentError>;

    /// Apply only the supplied fields
    async fn update_payment(
        &self,
        id: &str,
        request: UpdatePaymentRequest,
    ) -> Result<(), PaymentError>;

    /// Delete a payment
    async fn delete_payment(&self, id: &str) -> Result<(), PaymentError>;
}

/// Implementation of PaymentService
pub struct PaymentServiceImpl {
    payment_repository: Arc<dyn PaymentRepository>,
    concept_repository: Arc<dyn ConceptRepository>,
}

impl PaymentServiceImpl {
    pub fn new(
        payment_repository: Arc<dyn PaymentRepository>,
        concept_repository: Arc<dyn ConceptRepository>,
    ) -> Self {
        Self {
            payment_repository,
            concept_repository,
        }
    }
}

fn required_day(raw: &str) -> Result<NaiveDate, PaymentError> {
    parse_day(raw).ok_or_else(|| PaymentError::InvalidDate(raw.trim().to_string()))
}

fn checked_amount(amount: Decimal) -> Result<Decimal, PaymentError> {
    validate_non_negative_amount(&amount).map_err(|_| PaymentError::InvalidAmount)?;
    Ok(amount)
}

#[async_trait]
impl PaymentService for PaymentServiceImpl {
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<Payment, PaymentError> {
        let concept_id = request
            .concept_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(PaymentError::ConceptRequired)?
            .to_string();
        let amount = checked_amount(request.amount)?;
        let date = match request.date.as_deref().map(str::trim) {
            None | Some("") => Utc::now().date_naive(),
            Some(raw) => required_day(raw)?,
        };

        if self.concept_repository.find_by_id(&concept_id).await?.is_none() {
            return Err(PaymentError::ConceptNotFound);
        }

        let payment = Payment {
            id: Uuid::new_v4().to_string(),
            concept_id,
            amount,
            date,
        };

        // A concept deleted after the lookup surfaces as a key violation
        self.payment_repository
            .create(payment)
            .await
            .map_err(|e| match e {
                RepositoryError::ConstraintViolation(_) => PaymentError::ConceptNotFound,
                other => other.into(),
            })
    }

    async fn update_payment(
        &self,
        id: &str,
        request: UpdatePaymentRequest,
    ) -> Result<(), PaymentError> {
        let changes = PaymentChanges {
            amount: request.amount.map(checked_amount).transpose()?,
            date: request.date.as_deref().map(required_day).transpose()?,
        };

        if self.payment_repository.find_by_id(id).await?.is_none() {
            return Err(PaymentError::PaymentNotFound);
        }

        self.payment_repository.update(id, &changes).await?;
        Ok(())
    }

    async fn delete_payment(&self, id: &str) -> Result<(), PaymentError> {
        self.payment_repository
            .delete(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => PaymentError::PaymentNotFound,
                other => other.into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::concept::{Concept, ConceptChanges, NewConcept};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockPaymentRepository {
        payments: Mutex<HashMap<String, Payment>>,
        updates: Mutex<Vec<(String, PaymentChanges)>>,
    }

    #[async_trait]
    impl PaymentRepository for MockPaymentRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, RepositoryError> {
            Ok(self.payments.lock().unwrap().get(id).cloned())
        }

        async fn create(&self, payment: Payment) -> Result<Payment, RepositoryError> {
            self.payments
                .lock()
                .unwrap()
                .insert(payment.id.clone(), payment.clone());
            Ok(payment)
        }

        async fn update(&self, id: &str, changes: &PaymentChanges) -> Result<(), RepositoryError> {
            self.updates
                .lock()
                .unwrap()
                .push((id.to_string(), changes.clone()));
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
            self.payments
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound("payment"))
        }
    }

    // Knows exactly one concept, "c1"
    struct MockConceptRepository;

    #[async_trait]
    impl ConceptRepository for MockConceptRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<Concept>, RepositoryError> {
            Ok((id == "c1").then(|| Concept {
                id: "c1".to_string(),
                title: "Luz".to_string(),
                amount: Decimal::from(40),
                introduced_at: None,
                category_id: "general".to_string(),
                payments: Vec::new(),
            }))
        }

        async fn create(&self, _concept: NewConcept) -> Result<Concept, RepositoryError> {
            Err(RepositoryError::DatabaseError("read only".to_string()))
        }

        async fn update(&self, _id: &str, _changes: &ConceptChanges) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn delete_cascading(&self, _id: &str) -> Result<u64, RepositoryError> {
            Ok(0)
        }
    }

    fn setup() -> (Arc<MockPaymentRepository>, PaymentServiceImpl) {
        let payments = Arc::new(MockPaymentRepository::default());
        let service = PaymentServiceImpl::new(payments.clone(), Arc::new(MockConceptRepository));
        (payments, service)
    }

    fn create_request(concept_id: Option<&str>, amount: i64, date: Option<&str>) -> CreatePaymentRequest {
        CreatePaymentRequest {
            concept_id: concept_id.map(str::to_string),
            amount: Decimal::from(amount),
            date: date.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_defaults_date_to_today() {
        let (_payments, service) = setup();

        let payment = service
            .create_payment(create_request(Some("c1"), 12, None))
            .await
            .unwrap();

        assert_eq!(payment.date, Utc::now().date_naive());
        assert_eq!(payment.concept_id, "c1");
    }

    #[tokio::test]
    async fn test_create_uses_given_date() {
        let (_payments, service) = setup();

        let payment = service
            .create_payment(create_request(Some("c1"), 12, Some("2024-01-15")))
            .await
            .unwrap();

        assert_eq!(payment.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[tokio::test]
    async fn test_create_requires_existing_concept() {
        let (payments, service) = setup();

        let missing = service.create_payment(create_request(None, 1, None)).await;
        assert!(matches!(missing, Err(PaymentError::ConceptRequired)));

        let blank = service.create_payment(create_request(Some(" "), 1, None)).await;
        assert!(matches!(blank, Err(PaymentError::ConceptRequired)));

        let unknown = service
            .create_payment(create_request(Some("ghost"), 1, None))
            .await;
        assert!(matches!(unknown, Err(PaymentError::ConceptNotFound)));

        assert!(payments.payments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_negative_amount_and_bad_date() {
        let (_payments, service) = setup();

        let negative = service
            .create_payment(create_request(Some("c1"), -1, None))
            .await;
        assert!(matches!(negative, Err(PaymentError::InvalidAmount)));

        let bad_date = service
            .create_payment(create_request(Some("c1"), 1, Some("15/01/2024")))
            .await;
        assert!(matches!(bad_date, Err(PaymentError::InvalidDate(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_payment() {
        let (payments, service) = setup();

        let update = service
            .update_payment("ghost", UpdatePaymentRequest::default())
            .await;
        assert!(matches!(update, Err(PaymentError::PaymentNotFound)));

        let delete = service.delete_payment("ghost").await;
        assert!(matches!(delete, Err(PaymentError::PaymentNotFound)));

        assert!(payments.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_given_fields() {
        let (payments, service) = setup();
        let created = service
            .create_payment(create_request(Some("c1"), 5, None))
            .await
            .unwrap();

        let request = UpdatePaymentRequest {
            amount: None,
            date: Some("2023-12-31".to_string()),
        };
        service.update_payment(&created.id, request).await.unwrap();

        let updates = payments.updates.lock().unwrap();
        assert_eq!(
            updates[0].1,
            PaymentChanges {
                amount: None,
                date: NaiveDate::from_ymd_opt(2023, 12, 31),
            }
        );
    }
}
