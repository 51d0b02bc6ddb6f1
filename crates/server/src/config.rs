//! Server configuration.

use std::env;

use regex::Regex;

use common::{CacheConfig, RemoteStoreConfig, ServiceConfig};

/// Default pattern for static assets and images that bypass the route guard.
pub const DEFAULT_GUARD_EXCLUDE_PATTERN: &str =
    r"^/(?:_next/static|_next/image|static/|favicon\.ico)|\.(?:svg|png|jpe?g|gif|webp|ico)$";

/// Default pattern for the auth callback exemption.
pub const DEFAULT_AUTH_CALLBACK_PATTERN: &str = r"^/auth/callback(?:/|$)";

/// Default redirect target for the auth code flow.
pub const DEFAULT_CALLBACK_URL: &str = "http://localhost:3000/auth/callback";

/// Route guard configuration.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Where unauthenticated visitors of protected paths are sent
    pub login_path: String,
    /// Where authenticated visitors of the login path are sent
    pub dashboard_path: String,
    /// Path prefixes that require an identity
    pub protected_prefixes: Vec<String>,
    /// Paths passed through without any identity check
    pub auth_callback_pattern: Regex,
    /// Paths that bypass the guard entirely
    pub exclude_pattern: Regex,
}

impl GuardConfig {
    pub fn new(
        login_path: impl Into<String>,
        dashboard_path: impl Into<String>,
        protected_prefixes: Vec<String>,
        auth_callback_pattern: &str,
        exclude_pattern: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            login_path: login_path.into(),
            dashboard_path: dashboard_path.into(),
            protected_prefixes,
            auth_callback_pattern: Regex::new(auth_callback_pattern)?,
            exclude_pattern: Regex::new(exclude_pattern)?,
        })
    }

    fn from_env() -> Result<Self, regex::Error> {
        let protected_prefixes = env::var("PROTECTED_PREFIXES")
            .map(|raw| parse_list(&raw))
            .unwrap_or_else(|_| vec!["/dashboard".to_string()]);

        Self::new(
            env::var("LOGIN_PATH").unwrap_or_else(|_| "/login".to_string()),
            env::var("DASHBOARD_PATH").unwrap_or_else(|_| "/dashboard".to_string()),
            protected_prefixes,
            &env::var("AUTH_CALLBACK_PATTERN")
                .unwrap_or_else(|_| DEFAULT_AUTH_CALLBACK_PATTERN.to_string()),
            &env::var("GUARD_EXCLUDE_PATTERN")
                .unwrap_or_else(|_| DEFAULT_GUARD_EXCLUDE_PATTERN.to_string()),
        )
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            dashboard_path: "/dashboard".to_string(),
            protected_prefixes: vec!["/dashboard".to_string()],
            auth_callback_pattern: Regex::new(DEFAULT_AUTH_CALLBACK_PATTERN)
                .expect("default auth callback pattern is valid"),
            exclude_pattern: Regex::new(DEFAULT_GUARD_EXCLUDE_PATTERN)
                .expect("default exclude pattern is valid"),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Prefix for every session cookie name
    pub cookie_prefix: String,
    /// Refresh the session when the access token expires within this window
    pub refresh_margin_seconds: i64,
    /// Mark cookies `Secure`
    pub secure_cookies: bool,
    /// Absolute URL the identity provider sends the auth code back to
    pub callback_url: String,
}

impl SessionConfig {
    pub fn access_cookie(&self) -> String {
        format!("{}-access-token", self.cookie_prefix)
    }

    pub fn refresh_cookie(&self) -> String {
        format!("{}-refresh-token", self.cookie_prefix)
    }

    pub fn expires_cookie(&self) -> String {
        format!("{}-expires-at", self.cookie_prefix)
    }

    pub fn code_verifier_cookie(&self) -> String {
        format!("{}-code-verifier", self.cookie_prefix)
    }

    fn from_env() -> Self {
        Self {
            cookie_prefix: env::var("SESSION_COOKIE_PREFIX").unwrap_or_else(|_| "sb".to_string()),
            refresh_margin_seconds: env::var("SESSION_REFRESH_MARGIN_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            secure_cookies: env::var("SECURE_COOKIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(!cfg!(debug_assertions)),
            callback_url: env::var("AUTH_CALLBACK_URL")
                .unwrap_or_else(|_| DEFAULT_CALLBACK_URL.to_string()),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_prefix: "sb".to_string(),
            refresh_margin_seconds: 60,
            secure_cookies: false,
            callback_url: DEFAULT_CALLBACK_URL.to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub remote: RemoteStoreConfig,
    pub cache: CacheConfig,
    pub guard: GuardConfig,
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails only when a configured guard pattern is not a valid regex.
    pub fn from_env() -> Result<Self, regex::Error> {
        let service = ServiceConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ..ServiceConfig::default()
        };

        let remote = RemoteStoreConfig {
            url: env::var("REMOTE_STORE_URL")
                .unwrap_or_else(|_| RemoteStoreConfig::default().url),
            api_key: env::var("REMOTE_STORE_API_KEY").unwrap_or_else(|_| {
                tracing::warn!("REMOTE_STORE_API_KEY not set, remote store calls will be rejected");
                String::new()
            }),
            request_timeout_ms: env::var("REMOTE_STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        };

        let cache = CacheConfig {
            url: env::var("REDIS_URL").unwrap_or_else(|_| CacheConfig::default().url),
            default_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
        };

        Ok(Self {
            service,
            remote,
            cache,
            guard: GuardConfig::from_env()?,
            session: SessionConfig::from_env(),
        })
    }
}

/// Split a comma separated list, dropping blanks.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_skips_blanks() {
        assert_eq!(
            parse_list(" /dashboard, /reports ,,"),
            vec!["/dashboard".to_string(), "/reports".to_string()]
        );
    }

    #[test]
    fn default_exclusion_matches_assets_only() {
        let guard = GuardConfig::default();
        assert!(guard.exclude_pattern.is_match("/_next/static/chunk.js"));
        assert!(guard.exclude_pattern.is_match("/favicon.ico"));
        assert!(guard.exclude_pattern.is_match("/images/bread.png"));
        assert!(!guard.exclude_pattern.is_match("/dashboard"));
        assert!(!guard.exclude_pattern.is_match("/api/sales/delete"));
    }

    #[test]
    fn default_callback_pattern_is_anchored() {
        let guard = GuardConfig::default();
        assert!(guard.auth_callback_pattern.is_match("/auth/callback"));
        assert!(guard.auth_callback_pattern.is_match("/auth/callback/"));
        assert!(!guard.auth_callback_pattern.is_match("/auth/callbacks"));
        assert!(!guard.auth_callback_pattern.is_match("/dashboard/auth/callback"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = GuardConfig::new("/login", "/dashboard", vec![], "(", "^/static");
        assert!(result.is_err());
    }

    #[test]
    fn cookie_names_share_prefix() {
        let session = SessionConfig::default();
        assert_eq!(session.access_cookie(), "sb-access-token");
        assert_eq!(session.refresh_cookie(), "sb-refresh-token");
        assert_eq!(session.code_verifier_cookie(), "sb-code-verifier");
    }
}
