use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::models::payment::Payment;
use crate::models::state::StateSnapshot;
use crate::repositories::{RepositoryError, StateRepository};

/// State service errors
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Read side of the data store
#[async_trait]
pub trait StateService: Send + Sync {
    /// Categories by name and concepts by introduction day, each concept
    /// carrying its payments newest first
    async fn list_state(&self) -> Result<StateSnapshot, StateError>;
}

/// Implementation of StateService
pub struct StateServiceImpl {
    state_repository: Arc<dyn StateRepository>,
}

impl StateServiceImpl {
    pub fn new(state_repository: Arc<dyn StateRepository>) -> Self {
        Self { state_repository }
    }
}

#[async_trait]
impl StateService for StateServiceImpl {
    async fn list_state(&self) -> Result<StateSnapshot, StateError> {
        let contents = self.state_repository.snapshot().await?;
        let mut concepts = contents.concepts;

        // Payments arrive ordered, so pushing keeps each group ordered
        let mut by_concept: HashMap<String, Vec<Payment>> = HashMap::new();
        for payment in contents.payments {
            by_concept
                .entry(payment.concept_id.clone())
                .or_default()
                .push(payment);
        }

        for concept in &mut concepts {
            concept.payments = by_concept.remove(&concept.id).unwrap_or_default();
        }

        Ok(StateSnapshot {
            categories: contents.categories,
            concepts,
        })
    }
}
