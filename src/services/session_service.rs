use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::session::SessionUser;

/// Lifetime of a session token and of its cookie
pub const SESSION_TTL_DAYS: i64 = 7;

/// JWT claims carried by the session cookie
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    iat: i64,
    exp: i64,
}

/// A freshly minted session token
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Trait defining session token operations.
///
/// Sessions are stateless: the token is the whole session and the server
/// only needs the signing key to check it.
pub trait SessionService: Send + Sync {
    /// Sign a token for `user`, valid for seven days
    fn issue(&self, user: &SessionUser) -> Result<SessionToken, ApiError>;

    /// Check signature and expiry; any failure yields `None`
    fn verify(&self, token: &str) -> Option<SessionUser>;
}

/// HS256 implementation of SessionService
pub struct JwtSessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn issue_at(
        &self,
        user: &SessionUser,
        issued_at: DateTime<Utc>,
    ) -> Result<SessionToken, ApiError> {
        let expires_at = issued_at + Duration::days(SESSION_TTL_DAYS);

        let claims = Claims {
            email: user.email.clone(),
            name: user.name.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::internal(format!("session token signing failed: {}", e)))?;

        Ok(SessionToken { token, expires_at })
    }
}

impl SessionService for JwtSessionService {
    fn issue(&self, user: &SessionUser) -> Result<SessionToken, ApiError> {
        self.issue_at(user, Utc::now())
    }

    fn verify(&self, token: &str) -> Option<SessionUser> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(SessionUser::new(data.claims.email, data.claims.name)),
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    fn user() -> SessionUser {
        SessionUser::new("user@example.com", Some("Test User".to_string()))
    }

    #[test]
    fn test_issue_then_verify_returns_same_user() {
        let service = JwtSessionService::new("test_secret");

        let token = service.issue(&user()).unwrap();
        let verified = service.verify(&token.token);

        assert_eq!(verified, Some(user()));
    }

    #[test]
    fn test_user_without_name_round_trips() {
        let service = JwtSessionService::new("test_secret");
        let anonymous = SessionUser::new("user@example.com", None);

        let token = service.issue(&anonymous).unwrap();
        assert_eq!(service.verify(&token.token), Some(anonymous));
    }

    #[test]
    fn test_expiry_is_seven_days_out() {
        let service = JwtSessionService::new("test_secret");
        let now = Utc::now();

        let token = service.issue(&user()).unwrap();

        let diff = (token.expires_at - (now + Duration::days(7))).num_seconds().abs();
        assert!(diff < 60, "expiry should be ~7 days away (diff: {} seconds)", diff);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtSessionService::new("test_secret");
        let issued_at = Utc::now() - Duration::days(8);

        let token = service.issue_at(&user(), issued_at).unwrap();

        assert_eq!(service.verify(&token.token), None);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service1 = JwtSessionService::new("secret1");
        let service2 = JwtSessionService::new("secret2");

        let token = service1.issue(&user()).unwrap();

        assert_eq!(service2.verify(&token.token), None);
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let service = JwtSessionService::new("test_secret");
        let token = service.issue(&user()).unwrap().token;

        let parts: Vec<&str> = token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "email": "intruder@example.com",
                "iat": Utc::now().timestamp(),
                "exp": (Utc::now() + Duration::days(7)).timestamp(),
            })
            .to_string(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(service.verify(&forged), None);
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let service = JwtSessionService::new("test_secret");
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::json!({
                "email": "user@example.com",
                "iat": Utc::now().timestamp(),
                "exp": (Utc::now() + Duration::days(7)).timestamp(),
            })
            .to_string(),
        );

        assert_eq!(service.verify(&format!("{}.{}.", header, payload)), None);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = JwtSessionService::new("test_secret");

        let malformed_tokens = vec![
            "not.a.token",
            "invalid",
            "",
            "header.payload", // Missing signature
            "a.b.c.d",        // Too many parts
        ];

        for token in malformed_tokens {
            assert_eq!(
                service.verify(token),
                None,
                "Malformed token '{}' should be rejected",
                token
            );
        }
    }
}
