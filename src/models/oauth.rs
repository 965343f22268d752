use serde::Deserialize;
use utoipa::IntoParams;

/// Query string Google appends to the callback URL
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Body of a successful authorization-code exchange
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub id_token: Option<String>,
}

/// The identity claims read from the id token payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdTokenClaims {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Where to send the browser to start the Google sign-in
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_keeps_only_the_id_token() {
        let body = r#"{
            "access_token": "ya29.a0",
            "expires_in": 3599,
            "token_type": "Bearer",
            "id_token": "header.payload.signature"
        }"#;

        let response: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.id_token.as_deref(), Some("header.payload.signature"));
    }
}
