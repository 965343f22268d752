use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ErrorResponse};
use crate::models::concept::{ConceptResponse, CreateConceptRequest, UpdateConceptRequest};
use crate::models::state::OkResponse;
use crate::services::concept_service::{ConceptError, ConceptService};

impl From<ConceptError> for ApiError {
    fn from(err: ConceptError) -> Self {
        match err {
            ConceptError::Repository(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Handler for creating a concept
///
/// A missing or unknown `categoryId` files the concept under `general`.
#[utoipa::path(
    post,
    path = "/api/concepts",
    request_body = CreateConceptRequest,
    responses(
        (status = 201, description = "Concept created", body = ConceptResponse),
        (status = 400, description = "Blank title, negative amount or malformed day", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "concepts"
)]
pub async fn create_concept_handler(
    State(concept_service): State<Arc<dyn ConceptService>>,
    payload: Result<Json<CreateConceptRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ConceptResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let concept = concept_service.create_concept(request).await?;
    Ok((StatusCode::CREATED, Json(ConceptResponse { concept })))
}

/// Handler for a partial concept update
#[utoipa::path(
    patch,
    path = "/api/concepts/{id}",
    params(
        ("id" = String, Path, description = "Concept id")
    ),
    request_body = UpdateConceptRequest,
    responses(
        (status = 200, description = "Concept updated", body = OkResponse),
        (status = 400, description = "Invalid field, unknown concept or unknown category", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "concepts"
)]
pub async fn update_concept_handler(
    State(concept_service): State<Arc<dyn ConceptService>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateConceptRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    concept_service.update_concept(&id, request).await?;
    Ok(Json(OkResponse::ok()))
}

/// Handler for deleting a concept and its payments
#[utoipa::path(
    delete,
    path = "/api/concepts/{id}",
    params(
        ("id" = String, Path, description = "Concept id")
    ),
    responses(
        (status = 200, description = "Concept and its payments deleted", body = OkResponse),
        (status = 400, description = "Unknown concept", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "concepts"
)]
pub async fn delete_concept_handler(
    State(concept_service): State<Arc<dyn ConceptService>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    concept_service.delete_concept(&id).await?;
    Ok(Json(OkResponse::ok()))
}
