use axum::{Json, extract::State};
use std::sync::Arc;

use crate::error::{ApiError, ErrorResponse};
use crate::models::state::StateSnapshot;
use crate::services::state_service::{StateError, StateService};

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::Repository(e) => e.into(),
        }
    }
}

/// Handler returning every category and concept, payments included
#[utoipa::path(
    get,
    path = "/api/state",
    responses(
        (status = 200, description = "Full data snapshot", body = StateSnapshot),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 403, description = "Email is not allowlisted", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "state"
)]
pub async fn get_state_handler(
    State(state_service): State<Arc<dyn StateService>>,
) -> Result<Json<StateSnapshot>, ApiError> {
    Ok(Json(state_service.list_state().await?))
}
