use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::category::GENERAL_CATEGORY_ID;
use crate::models::concept::{
    Concept, ConceptChanges, CreateConceptRequest, NewConcept, UpdateConceptRequest,
};
use crate::repositories::{CategoryRepository, ConceptRepository, RepositoryError};
use crate::validation::{parse_optional_day, validate_non_negative_amount};

/// Concept service errors
#[derive(Debug, thiserror::Error)]
pub enum ConceptError {
    #[error("title is required")]
    TitleRequired,

    #[error("amount must be a non-negative number")]
    InvalidAmount,

    #[error("{0}")]
    InvalidDay(String),

    #[error("concept not found")]
    ConceptNotFound,

    #[error("category not found")]
    CategoryNotFound,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Trait defining concept service operations
#[async_trait]
pub trait ConceptService: Send + Sync {
    /// Create a concept; an unknown category falls back to `general`
    async fn create_concept(&self, request: CreateConceptRequest)
    -> Result<Concept, ConceptError>;

    /// Apply only the supplied fields; nothing is written if any of them is invalid
    async fn update_concept(
        &self,
        id: &str,
        request: UpdateConceptRequest,
    ) -> Result<(), ConceptError>;

    /// Delete a concept together with its payments
    async fn delete_concept(&self, id: &str) -> Result<(), ConceptError>;
}

/// Implementation of ConceptService
pub struct ConceptServiceImpl {
    concept_repository: Arc<dyn ConceptRepository>,
    category_repository: Arc<dyn CategoryRepository>,
}

impl ConceptServiceImpl {
    pub fn new(
        concept_repository: Arc<dyn ConceptRepository>,
        category_repository: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            concept_repository,
            category_repository,
        }
    }

    async fn resolve_category(&self, requested: Option<&str>) -> Result<String, ConceptError> {
        let Some(requested) = requested.map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(GENERAL_CATEGORY_ID.to_string());
        };

        if self.category_repository.find_by_id(requested).await?.is_some() {
            return Ok(requested.to_string());
        }

        tracing::debug!(category_id = requested, "unknown category, using general");
        Ok(GENERAL_CATEGORY_ID.to_string())
    }
}

fn required_title(raw: &str) -> Result<String, ConceptError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ConceptError::TitleRequired);
    }
    Ok(title.to_string())
}

fn checked_amount(amount: Decimal) -> Result<Decimal, ConceptError> {
    validate_non_negative_amount(&amount).map_err(|_| ConceptError::InvalidAmount)?;
    Ok(amount)
}

#[async_trait]
impl ConceptService for ConceptServiceImpl {
    async fn create_concept(
        &self,
        request: CreateConceptRequest,
    ) -> Result<Concept, ConceptError> {
        let title = required_title(&request.title)?;
        let amount = checked_amount(request.amount)?;
        let introduced_at =
            parse_optional_day(request.introduced_at.as_deref()).map_err(ConceptError::InvalidDay)?;
        let category_id = self
            .resolve_category(request.category_id.as_deref())
            .await?;

        let concept = NewConcept {
            id: Uuid::new_v4().to_string(),
            title,
            amount,
            introduced_at,
            category_id,
        };

        match self.concept_repository.create(concept.clone()).await {
            // The category was deleted between the lookup and the insert
            Err(RepositoryError::ConstraintViolation(_))
                if concept.category_id != GENERAL_CATEGORY_ID =>
            {
                tracing::debug!(
                    category_id = %concept.category_id,
                    "category vanished before insert, using general"
                );
                let concept = NewConcept {
                    category_id: GENERAL_CATEGORY_ID.to_string(),
                    ..concept
                };
                Ok(self.concept_repository.create(concept).await?)
            }
            result => Ok(result?),
        }
    }

    async fn update_concept(
        &self,
        id: &str,
        request: UpdateConceptRequest,
    ) -> Result<(), ConceptError> {
        let changes = ConceptChanges {
            title: request.title.as_deref().map(required_title).transpose()?,
            amount: request.amount.map(checked_amount).transpose()?,
            introduced_at: request
                .introduced_at
                .map(|day| parse_optional_day(day.as_deref()))
                .transpose()
                .map_err(ConceptError::InvalidDay)?,
            category_id: request.category_id.map(|c| c.trim().to_string()),
        };

        if self.concept_repository.find_by_id(id).await?.is_none() {
            return Err(ConceptError::ConceptNotFound);
        }

        if let Some(category_id) = &changes.category_id
            && self.category_repository.find_by_id(category_id).await?.is_none()
        {
            return Err(ConceptError::CategoryNotFound);
        }

        self.concept_repository.update(id, &changes).await?;
        Ok(())
    }

    async fn delete_concept(&self, id: &str) -> Result<(), ConceptError> {
        self.concept_repository
            .delete_cascading(id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound(_) => ConceptError::ConceptNotFound,
                other => other.into(),
            })?;
        Ok(())
    }
}
