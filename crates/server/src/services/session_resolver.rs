//! Session resolution from request cookies.
//!
//! The session lives in three cookies: the access token, the refresh token
//! and the absolute expiry of the access token. Resolution hands back the
//! identity (if any) together with the cookie jar to attach to the response,
//! which carries the rotated tokens after a refresh.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::{debug, warn};

use domain::Identity;

use crate::clients::{AuthSession, IdentityApi};
use crate::config::SessionConfig;

/// Lifetime of the refresh token cookie.
const REFRESH_COOKIE_MAX_AGE_DAYS: i64 = 30;

/// Lifetime of the code verifier cookie between authorize and callback.
const CODE_VERIFIER_MAX_AGE_SECONDS: i64 = 600;

/// Outcome of resolving a request's session.
#[derive(Debug, Clone)]
pub struct SessionResolution {
    pub identity: Option<Identity>,
    pub cookies: CookieJar,
}

impl SessionResolution {
    fn anonymous(cookies: CookieJar) -> Self {
        Self {
            identity: None,
            cookies,
        }
    }
}

/// Resolves the authenticated identity behind a cookie jar.
#[derive(Clone)]
pub struct SessionResolver {
    identity: Arc<dyn IdentityApi>,
    config: SessionConfig,
}

impl SessionResolver {
    pub fn new(identity: Arc<dyn IdentityApi>, config: SessionConfig) -> Self {
        Self { identity, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolve the identity for the request's cookies. Never fails.
    pub async fn resolve(&self, jar: CookieJar) -> SessionResolution {
        self.resolve_at(jar, Utc::now().timestamp()).await
    }

    async fn resolve_at(&self, jar: CookieJar, now: i64) -> SessionResolution {
        let access = cookie_value(&jar, &self.config.access_cookie());
        let refresh = cookie_value(&jar, &self.config.refresh_cookie());
        let expires_at =
            cookie_value(&jar, &self.config.expires_cookie()).and_then(|v| v.parse::<i64>().ok());

        let stale = match (&access, expires_at) {
            (None, _) => true,
            (Some(_), Some(expiry)) => expiry - now <= self.config.refresh_margin_seconds,
            (Some(_), None) => false,
        };

        if stale {
            if let Some(refresh) = refresh {
                return self.refresh(jar, &refresh, now).await;
            }
        }

        match access {
            Some(access) => {
                let identity = self.lookup(&access).await;
                SessionResolution {
                    identity,
                    cookies: jar,
                }
            }
            None => SessionResolution::anonymous(jar),
        }
    }

    async fn refresh(&self, jar: CookieJar, refresh_token: &str, now: i64) -> SessionResolution {
        match self.identity.refresh_session(refresh_token).await {
            Ok(Some(session)) => {
                debug!("session refreshed");
                let identity = match session.user.clone() {
                    Some(user) => Some(user),
                    None => self.lookup(&session.access_token).await,
                };
                SessionResolution {
                    identity,
                    cookies: self.store_session(jar, &session, now),
                }
            }
            Ok(None) => {
                debug!("refresh token rejected, clearing session");
                SessionResolution::anonymous(self.clear_session(jar))
            }
            Err(e) => {
                warn!(error = %e, "session refresh failed");
                SessionResolution::anonymous(jar)
            }
        }
    }

    async fn lookup(&self, access_token: &str) -> Option<Identity> {
        match self.identity.get_user(access_token).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "identity lookup failed");
                None
            }
        }
    }

    /// Write a fresh session into the jar.
    pub fn store_session(&self, jar: CookieJar, session: &AuthSession, now: i64) -> CookieJar {
        let expiry = session.expiry(now);
        let access_age = (expiry - now).max(0);
        let refresh_age = REFRESH_COOKIE_MAX_AGE_DAYS * 24 * 60 * 60;

        jar.add(self.session_cookie(
            self.config.access_cookie(),
            session.access_token.clone(),
            access_age,
        ))
        .add(self.session_cookie(
            self.config.refresh_cookie(),
            session.refresh_token.clone(),
            refresh_age,
        ))
        .add(self.session_cookie(self.config.expires_cookie(), expiry.to_string(), refresh_age))
    }

    /// Remove every session cookie from the jar.
    pub fn clear_session(&self, jar: CookieJar) -> CookieJar {
        [
            self.config.access_cookie(),
            self.config.refresh_cookie(),
            self.config.expires_cookie(),
        ]
        .into_iter()
        .fold(jar, |jar, name| {
            jar.remove(Cookie::build((name, "")).path("/"))
        })
    }

    /// Keep the code verifier until the auth callback comes back.
    pub fn store_code_verifier(&self, jar: CookieJar, verifier: &str) -> CookieJar {
        jar.add(self.session_cookie(
            self.config.code_verifier_cookie(),
            verifier.to_string(),
            CODE_VERIFIER_MAX_AGE_SECONDS,
        ))
    }

    /// Code verifier stored by the authorize redirect, if any.
    pub fn code_verifier(&self, jar: &CookieJar) -> Option<String> {
        cookie_value(jar, &self.config.code_verifier_cookie())
    }

    /// Drop the code verifier once it has been spent.
    pub fn clear_code_verifier(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build((self.config.code_verifier_cookie(), "")).path("/"))
    }

    fn session_cookie(&self, name: String, value: String, max_age_seconds: i64) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure_cookies)
            .max_age(time::Duration::seconds(max_age_seconds))
            .build()
    }
}

fn cookie_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use common::AppError;

    use crate::clients::MockIdentityApi;

    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn jar_with(cookies: &[(&str, &str)]) -> CookieJar {
        cookies.iter().fold(CookieJar::new(), |jar, (name, value)| {
            jar.add(Cookie::new(name.to_string(), value.to_string()))
        })
    }

    fn resolver(api: MockIdentityApi) -> SessionResolver {
        SessionResolver::new(Arc::new(api), SessionConfig::default())
    }

    fn baker() -> Identity {
        Identity::new("u1", Some("baker@example.com".to_string()))
    }

    #[tokio::test]
    async fn no_cookies_is_anonymous_without_remote_call() {
        let api = MockIdentityApi::new();
        let resolution = resolver(api).resolve_at(CookieJar::new(), NOW).await;
        assert!(resolution.identity.is_none());
    }

    #[tokio::test]
    async fn fresh_access_token_is_looked_up() {
        let mut api = MockIdentityApi::new();
        api.expect_get_user()
            .with(eq("a1"))
            .times(1)
            .returning(|_| Ok(Some(baker())));
        api.expect_refresh_session().never();

        let expiry = (NOW + 3600).to_string();
        let jar = jar_with(&[
            ("sb-access-token", "a1"),
            ("sb-refresh-token", "r1"),
            ("sb-expires-at", expiry.as_str()),
        ]);

        let resolution = resolver(api).resolve_at(jar, NOW).await;
        assert_eq!(resolution.identity, Some(baker()));
    }

    #[tokio::test]
    async fn near_expiry_refreshes_and_rotates_cookies() {
        let mut api = MockIdentityApi::new();
        api.expect_refresh_session()
            .with(eq("r1"))
            .times(1)
            .returning(|_| {
                Ok(Some(AuthSession {
                    access_token: "a2".to_string(),
                    refresh_token: "r2".to_string(),
                    expires_in: 3600,
                    expires_at: None,
                    user: Some(baker()),
                }))
            });
        api.expect_get_user().never();

        let expiry = (NOW + 30).to_string();
        let jar = jar_with(&[
            ("sb-access-token", "a1"),
            ("sb-refresh-token", "r1"),
            ("sb-expires-at", expiry.as_str()),
        ]);

        let resolution = resolver(api).resolve_at(jar, NOW).await;

        assert_eq!(resolution.identity, Some(baker()));
        assert_eq!(
            resolution.cookies.get("sb-access-token").map(|c| c.value().to_string()),
            Some("a2".to_string())
        );
        assert_eq!(
            resolution.cookies.get("sb-expires-at").map(|c| c.value().to_string()),
            Some((NOW + 3600).to_string())
        );
    }

    #[tokio::test]
    async fn rejected_refresh_clears_session() {
        let mut api = MockIdentityApi::new();
        api.expect_refresh_session().returning(|_| Ok(None));

        let jar = jar_with(&[("sb-refresh-token", "revoked")]);
        let resolution = resolver(api).resolve_at(jar, NOW).await;

        assert!(resolution.identity.is_none());
        assert!(resolution.cookies.get("sb-refresh-token").is_none());
    }

    #[tokio::test]
    async fn identity_fault_degrades_to_anonymous() {
        let mut api = MockIdentityApi::new();
        api.expect_get_user()
            .returning(|_| Err(AppError::upstream("identity API unreachable")));

        let jar = jar_with(&[("sb-access-token", "a1")]);
        let resolution = resolver(api).resolve_at(jar, NOW).await;

        assert!(resolution.identity.is_none());
        assert_eq!(
            resolution.cookies.get("sb-access-token").map(|c| c.value().to_string()),
            Some("a1".to_string())
        );
    }

    #[test]
    fn code_verifier_cookie_is_short_lived() {
        let resolver = resolver(MockIdentityApi::new());

        let jar = resolver.store_code_verifier(CookieJar::new(), "v1");
        let cookie = jar.get("sb-code-verifier").unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(CODE_VERIFIER_MAX_AGE_SECONDS))
        );
        assert_eq!(resolver.code_verifier(&jar), Some("v1".to_string()));
    }

    #[test]
    fn stored_session_cookies_are_http_only() {
        let resolver = resolver(MockIdentityApi::new());
        let session = AuthSession {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 60,
            expires_at: Some(NOW + 60),
            user: None,
        };

        let jar = resolver.store_session(CookieJar::new(), &session, NOW);
        let access = jar.get("sb-access-token").unwrap();

        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.path(), Some("/"));
        assert_eq!(access.max_age(), Some(time::Duration::seconds(60)));
    }
}
