use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ErrorResponse};
use crate::models::payment::{CreatePaymentRequest, PaymentResponse, UpdatePaymentRequest};
use crate::models::state::OkResponse;
use crate::services::payment_service::{PaymentError, PaymentService};

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Repository(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Handler for recording a payment
#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentResponse),
        (status = 400, description = "Missing or unknown concept, negative amount or malformed date", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "payments"
)]
pub async fn create_payment_handler(
    State(payment_service): State<Arc<dyn PaymentService>>,
    payload: Result<Json<CreatePaymentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let payment = payment_service.create_payment(request).await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse { payment })))
}

/// Handler for a partial payment update
#[utoipa::path(
    patch,
    path = "/api/payments/{id}",
    params(
        ("id" = String, Path, description = "Payment id")
    ),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment updated", body = OkResponse),
        (status = 400, description = "Invalid field or unknown payment", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "payments"
)]
pub async fn update_payment_handler(
    State(payment_service): State<Arc<dyn PaymentService>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePaymentRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    payment_service.update_payment(&id, request).await?;
    Ok(Json(OkResponse::ok()))
}

/// Handler for deleting a payment
#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    params(
        ("id" = String, Path, description = "Payment id")
    ),
    responses(
        (status = 200, description = "Payment deleted", body = OkResponse),
        (status = 400, description = "Unknown payment", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "payments"
)]
pub async fn delete_payment_handler(
    State(payment_service): State<Arc<dyn PaymentService>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    payment_service.delete_payment(&id).await?;
    Ok(Json(OkResponse::ok()))
}
