use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{
    deserialize_amount, deserialize_optional_amount, validate_non_negative_amount,
};

/// A payment made against a concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub concept_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 12.5)]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date, example = "2024-01-15")]
    pub date: NaiveDate,
}

/// Request payload for recording a payment; `date` defaults to today (UTC)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({"conceptId": "0b6c5f0e-8d1e-4a43-9a57-5f1b0b8c2f11", "amount": 12.5}))]
pub struct CreatePaymentRequest {
    pub concept_id: Option<String>,

    #[serde(deserialize_with = "deserialize_amount")]
    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = f64, minimum = 0.0)]
    pub amount: Decimal,

    #[schema(format = Date)]
    pub date: Option<String>,
}

/// Partial update of a payment; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    #[validate(custom(function = "validate_non_negative_amount"))]
    #[schema(value_type = Option<f64>, minimum = 0.0)]
    pub amount: Option<Decimal>,

    #[schema(format = Date)]
    pub date: Option<String>,
}

/// Validated changes for a payment row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentChanges {
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

impl PaymentChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.date.is_none()
    }
}

/// Response body of `POST /api/payments`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub payment: Payment,
}
