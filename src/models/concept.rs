use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::payment::Payment;
use crate::validation::{
    deserialize_amount, deserialize_optional_amount, double_option, validate_non_negative_amount,
};

/// A recurring or one-off spending item, listed with its payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    #[schema(example = "Factura")]
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 12.5)]
    pub amount: Decimal,
    #[schema(value_type = Option<String>, format = Date, example = "2024-01-01")]
    pub introduced_at: Option<NaiveDate>,
    #[schema(example = "general")]
    pub category_id: String,
    pub payments: Vec<Payment>,
}

/// Request payload for creating a concept
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"title": "Factura", "amount": 12.5, "categoryId": "agua"}))]
pub struct CreateConceptRequest {
    #[serde(default)]
    pub title: String,

    #[serde(deserialize_with = "deserialize_amount")]
    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = f64, minimum = 0.0)]
    pub amount: Decimal,

    #[schema(format = Date)]
    pub introduced_at: Option<String>,

    pub category_id: Option<String>,
}

/// Partial update of a concept.
///
/// `introducedAt: null` clears the day; leaving it out keeps it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConceptRequest {
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = Option<f64>, minimum = 0.0)]
    pub amount: Option<Decimal>,

    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub introduced_at: Option<Option<String>>,

    pub category_id: Option<String>,
}

/// A concept row ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewConcept {
    pub id: String,
    pub title: String,
    pub amount: Decimal,
    pub introduced_at: Option<NaiveDate>,
    pub category_id: String,
}

/// Validated changes for a concept row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptChanges {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub introduced_at: Option<Option<NaiveDate>>,
    pub category_id: Option<String>,
}

impl ConceptChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.introduced_at.is_none()
            && self.category_id.is_none()
    }
}

/// Response body of `POST /api/concepts`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConceptResponse {
    pub concept: Concept,
}
