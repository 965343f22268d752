use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{ApiError, ErrorResponse};
use crate::middleware::auth_middleware::AuthenticatedUser;
use crate::models::category::{CategoryResponse, CreateCategoryRequest, RenameCategoryRequest};
use crate::models::state::OkResponse;
use crate::services::category_service::{CategoryError, CategoryService};

impl From<CategoryError> for ApiError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::Repository(e) => e.into(),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Handler for creating a category
///
/// The id is the lower-cased name with whitespace runs turned into hyphens.
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Blank name or a category with that id exists", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let category = category_service.create_category(request).await?;

    tracing::info!(user = %user.email, category_id = %category.id, "category created");
    Ok((StatusCode::CREATED, Json(CategoryResponse { category })))
}

/// Handler for renaming a category
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category id")
    ),
    request_body = RenameCategoryRequest,
    responses(
        (status = 200, description = "Category renamed", body = OkResponse),
        (status = 400, description = "Blank name, unknown id, or the general category", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "categories"
)]
pub async fn rename_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Path(id): Path<String>,
    payload: Result<Json<RenameCategoryRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    category_service.rename_category(&id, request).await?;
    Ok(Json(OkResponse::ok()))
}

/// Handler for deleting a category
///
/// Concepts in the category are moved to `general` in the same transaction.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = String, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted", body = OkResponse),
        (status = 400, description = "Unknown id or the general category", body = ErrorResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(category_service): State<Arc<dyn CategoryService>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, ApiError> {
    category_service.delete_category(&id).await?;

    tracing::info!(user = %user.email, category_id = %id, "category deleted");
    Ok(Json(OkResponse::ok()))
}
