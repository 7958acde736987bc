//! Process configuration, read once at startup.

use std::net::SocketAddr;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Duration;
use thiserror::Error;

const DEV_SECRET: &str = "dev-secret";
const DEFAULT_TTL_SECS: i64 = 3600;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Attributes applied to the auth cookie when it is set or refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub max_age: Option<Duration>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
            max_age: None,
        }
    }
}

/// Cookie source for the auth token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub name: String,
    pub options: CookieOptions,
    /// Re-set the cookie on every request it successfully authenticates
    /// (sliding expiry).
    pub refresh: bool,
}

impl CookieSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: CookieOptions::default(),
            refresh: false,
        }
    }

    /// Build the auth cookie carrying `token`.
    pub fn cookie(&self, token: impl Into<String>) -> Cookie<'static> {
        let opts = &self.options;
        let mut builder = Cookie::build((self.name.clone(), token.into()))
            .path(opts.path.clone())
            .http_only(opts.http_only)
            .secure(opts.secure)
            .same_site(opts.same_site);
        if let Some(max_age) = opts.max_age {
            builder = builder.max_age(time::Duration::seconds(max_age.num_seconds()));
        }
        builder.build()
    }
}

/// Immutable API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub cookie: Option<CookieSettings>,
}

impl ApiConfig {
    /// Configuration with the given secret and defaults everywhere else.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            bind_addr: default_bind_addr(),
            jwt_secret: secret.into(),
            token_ttl: Duration::seconds(DEFAULT_TTL_SECS),
            cookie: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, in production).
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) if secret.is_empty() => {
                return Err(ConfigError::invalid("JWT_SECRET", "secret is required"));
            }
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?,
            None => default_bind_addr(),
        };

        let ttl_secs = parse_secs(&get, "JWT_EXPIRES_IN_SECS")?.unwrap_or(DEFAULT_TTL_SECS);
        if ttl_secs <= 0 {
            return Err(ConfigError::invalid("JWT_EXPIRES_IN_SECS", "must be positive"));
        }

        let cookie = match get("AUTH_COOKIE_NAME").filter(|n| !n.is_empty()) {
            None => None,
            Some(name) => {
                let mut settings = CookieSettings::new(name);
                settings.refresh = parse_bool(&get, "AUTH_COOKIE_REFRESH")?.unwrap_or(false);
                settings.options.secure = parse_bool(&get, "AUTH_COOKIE_SECURE")?.unwrap_or(false);
                settings.options.max_age = match parse_secs(&get, "AUTH_COOKIE_MAX_AGE_SECS")? {
                    Some(secs) if secs <= 0 => {
                        return Err(ConfigError::invalid(
                            "AUTH_COOKIE_MAX_AGE_SECS",
                            "must be positive",
                        ));
                    }
                    secs => secs.map(Duration::seconds),
                };
                Some(settings)
            }
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl: Duration::seconds(ttl_secs),
            cookie,
        })
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn parse_secs<F>(get: &F, key: &'static str) -> Result<Option<i64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<i64>()
                .map_err(|e| ConfigError::invalid(key, e.to_string()))
        })
        .transpose()
}

fn parse_bool<F>(get: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(ConfigError::invalid(key, format!("expected a boolean, got '{other}'"))),
        })
        .transpose()
}
