use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{category::Category, concept::Concept};

/// Everything the client renders: categories plus concepts with their payments
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StateSnapshot {
    pub categories: Vec<Category>,
    pub concepts: Vec<Concept>,
}

/// Acknowledgement returned by updates and deletes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"ok": true}))]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}
