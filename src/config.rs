use std::collections::HashSet;
use std::env;

use url::Url;

const DEV_AUTH_SECRET: &str = "dev-secret-change-me";

/// Configuration errors raised while reading the environment at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    MissingInProduction(&'static str),

    #[error("{name} is not a valid URL: {reason}")]
    InvalidUrl { name: &'static str, reason: String },

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Process-wide settings, read once from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub auth_secret: String,
    pub allowed_emails: Allowlist,
    pub google: GoogleConfig,
    /// `APP_ENV=production`: cookies get the `Secure` attribute
    pub production: bool,
    pub host: String,
    pub port: u16,
}

/// Google OAuth client settings.
///
/// Every field is optional so the server still boots without them; the
/// OAuth endpoints report the missing piece when they are hit.
#[derive(Debug, Clone, Default)]
pub struct GoogleConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub public_url: Option<Url>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let production = env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let database_url = non_empty_var("DATABASE_URL").unwrap_or_else(|| {
            if production {
                "sqlite://data/data.db".to_string()
            } else {
                "sqlite://data/dev.db".to_string()
            }
        });

        let auth_secret = match non_empty_var("AUTH_SECRET") {
            Some(secret) => secret,
            None if production => return Err(ConfigError::MissingInProduction("AUTH_SECRET")),
            None => {
                tracing::warn!("AUTH_SECRET not set, using the development secret");
                DEV_AUTH_SECRET.to_string()
            }
        };

        let allowed_emails = Allowlist::parse(&env::var("ALLOWED_EMAILS").unwrap_or_default());
        if allowed_emails.is_empty() {
            tracing::warn!("ALLOWED_EMAILS is empty, nobody will be able to sign in");
        }

        let public_url = match non_empty_var("PUBLIC_URL") {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
                name: "PUBLIC_URL",
                reason: e.to_string(),
            })?),
            None => None,
        };

        let port = match non_empty_var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "PORT",
                value: raw.clone(),
            })?,
            None => 8080,
        };

        Ok(Self {
            database_url,
            auth_secret,
            allowed_emails,
            google: GoogleConfig {
                client_id: non_empty_var("GOOGLE_CLIENT_ID"),
                client_secret: non_empty_var("GOOGLE_CLIENT_SECRET"),
                public_url,
            },
            production,
            host: non_empty_var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Immutable set of lower-cased email addresses allowed to sign in
#[derive(Debug, Clone, Default)]
pub struct Allowlist {
    emails: HashSet<String>,
}

impl Allowlist {
    /// Parses a comma separated list, ignoring blanks and case
    pub fn parse(raw: &str) -> Self {
        raw.split(',').map(str::to_string).collect()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }
}

impl FromIterator<String> for Allowlist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let emails = iter
            .into_iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }
}
