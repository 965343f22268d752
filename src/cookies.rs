use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::services::session_service::SESSION_TTL_DAYS;

/// Carries the signed session token
pub const SESSION_COOKIE: &str = "pagos_session";

/// Carries the CSRF nonce between the Google redirect and its callback
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

pub const OAUTH_STATE_TTL_SECS: i64 = 300;

/// Attributes shared by every cookie the server sets
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieSettings {
    /// Adds `Secure`; on in production
    pub secure: bool,
}

impl CookieSettings {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub fn session(&self, token: String) -> Cookie<'static> {
        self.build(SESSION_COOKIE, token, time::Duration::days(SESSION_TTL_DAYS))
    }

    pub fn cleared_session(&self) -> Cookie<'static> {
        self.build(SESSION_COOKIE, String::new(), time::Duration::ZERO)
    }

    pub fn oauth_state(&self, state: String) -> Cookie<'static> {
        self.build(
            OAUTH_STATE_COOKIE,
            state,
            time::Duration::seconds(OAUTH_STATE_TTL_SECS),
        )
    }

    pub fn cleared_oauth_state(&self) -> Cookie<'static> {
        self.build(OAUTH_STATE_COOKIE, String::new(), time::Duration::ZERO)
    }

    fn build(&self, name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = CookieSettings::new(false).session("token".to_string());
        let header = cookie.to_string();

        assert_eq!(cookie.name(), "pagos_session");
        assert_eq!(cookie.value(), "token");
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=604800"));
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn test_production_cookies_are_secure() {
        let header = CookieSettings::new(true).oauth_state("nonce".to_string()).to_string();

        assert!(header.contains("Secure"));
        assert!(header.contains("Max-Age=300"));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        let settings = CookieSettings::new(true);

        for cookie in [settings.cleared_session(), settings.cleared_oauth_state()] {
            let header = cookie.to_string();
            assert_eq!(cookie.value(), "");
            assert!(header.contains("Max-Age=0"));
            assert!(header.contains("HttpOnly"));
            assert!(header.contains("Path=/"));
        }
    }
}
