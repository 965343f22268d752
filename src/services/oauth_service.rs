use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use url::Url;
use uuid::Uuid;

use crate::config::{Allowlist, GoogleConfig};
use crate::error::ApiError;
use crate::models::oauth::{AuthorizationRequest, CallbackQuery, IdTokenClaims, TokenResponse};
use crate::models::session::SessionUser;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const CALLBACK_PATH: &str = "/api/auth/google/callback";
const SCOPES: &str = "openid email profile";

/// The external identity provider: builds the consent URL and redeems codes
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to, carrying `state`
    fn authorization_url(&self, state: &str) -> Result<String, ApiError>;

    /// Server-to-server exchange of an authorization code for tokens
    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ApiError>;
}

/// Google implementation of IdentityProvider
pub struct GoogleIdentityProvider {
    config: GoogleConfig,
    token_url: String,
    client: reqwest::Client,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleConfig) -> Result<Self, ApiError> {
        Self::with_token_url(config, GOOGLE_TOKEN_URL)
    }

    /// Same as `new` but redeeming codes at `token_url`
    pub fn with_token_url(config: GoogleConfig, token_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            token_url: token_url.to_string(),
            client,
        })
    }

    fn redirect_uri(&self) -> Result<Url, ApiError> {
        let public_url = self
            .config
            .public_url
            .as_ref()
            .ok_or_else(|| ApiError::internal("PUBLIC_URL is not configured"))?;

        public_url
            .join(CALLBACK_PATH)
            .map_err(|e| ApiError::internal(format!("cannot build redirect_uri: {}", e)))
    }

    fn client_id(&self) -> Result<&str, ApiError> {
        self.config
            .client_id
            .as_deref()
            .ok_or_else(|| ApiError::internal("GOOGLE_CLIENT_ID is not configured"))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, ApiError> {
        let redirect_uri = self.redirect_uri()?;
        let client_id = self.client_id()?;

        let url = Url::parse_with_params(
            GOOGLE_AUTH_URL,
            &[
                ("client_id", client_id),
                ("redirect_uri", redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| ApiError::internal(format!("cannot build authorization URL: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ApiError> {
        let redirect_uri = self.redirect_uri()?;
        let client_id = self.client_id()?;
        let client_secret = self
            .config
            .client_secret
            .as_deref()
            .ok_or_else(|| ApiError::internal("GOOGLE_CLIENT_SECRET is not configured"))?;

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::internal(format!("token exchange request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::internal(format!(
                "token exchange failed with {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ApiError::internal(format!("unreadable token response: {}", e)))
    }
}

/// Reads the claims of an id token without checking its signature.
///
/// The token comes straight from the provider's token endpoint over TLS;
/// its signature against the provider keys is not verified here.
pub fn decode_id_token_claims(id_token: &str) -> Result<IdTokenClaims, ApiError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::internal("id token is not a JWT"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ApiError::internal(format!("id token payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::internal(format!("id token payload is not JSON: {}", e)))
}

/// Trait defining the federated login flow
#[async_trait]
pub trait OAuthService: Send + Sync {
    /// Start a login: fresh CSRF state plus the provider URL carrying it
    fn begin(&self) -> Result<AuthorizationRequest, ApiError>;

    /// Finish a login from the callback query and the state stored in the
    /// browser; returns the allowlisted user to open a session for
    async fn complete(
        &self,
        query: &CallbackQuery,
        expected_state: Option<&str>,
    ) -> Result<SessionUser, ApiError>;
}

/// Implementation of OAuthService
pub struct OAuthServiceImpl {
    provider: Arc<dyn IdentityProvider>,
    allowlist: Arc<Allowlist>,
}

impl OAuthServiceImpl {
    pub fn new(provider: Arc<dyn IdentityProvider>, allowlist: Arc<Allowlist>) -> Self {
        Self {
            provider,
            allowlist,
        }
    }
}

#[async_trait]
impl OAuthService for OAuthServiceImpl {
    fn begin(&self) -> Result<AuthorizationRequest, ApiError> {
        let state = Uuid::new_v4().to_string();
        let url = self.provider.authorization_url(&state)?;
        Ok(AuthorizationRequest { url, state })
    }

    async fn complete(
        &self,
        query: &CallbackQuery,
        expected_state: Option<&str>,
    ) -> Result<SessionUser, ApiError> {
        if let Some(error) = &query.error {
            return Err(ApiError::unauthorized(format!(
                "identity provider returned '{}'",
                error
            )));
        }

        match (query.state.as_deref(), expected_state) {
            (Some(received), Some(expected)) if !expected.is_empty() && received == expected => {}
            _ => return Err(ApiError::unauthorized("oauth state mismatch")),
        }

        let code = query
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;

        let tokens = self.provider.exchange_code(code).await?;
        let id_token = tokens
            .id_token
            .ok_or_else(|| ApiError::internal("token response has no id_token"))?;

        let claims = decode_id_token_claims(&id_token)?;
        let email = claims.email.unwrap_or_default().trim().to_lowercase();

        if !self.allowlist.contains(&email) {
            return Err(ApiError::forbidden(format!("{} is not allowlisted", email)));
        }

        tracing::info!(%email, "google sign-in accepted");
        Ok(SessionUser::new(email, claims.name))
    }
}
