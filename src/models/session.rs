use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The signed-in principal, rebuilt from the session token on every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    #[schema(example = "user@example.com")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl SessionUser {
    pub fn new(email: impl Into<String>, name: Option<String>) -> Self {
        Self {
            email: email.into(),
            name: name.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Response body of `GET /api/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponse {
    pub user: SessionUser,
}
