//! HTTP adapter for `gatehouse-auth`: auth middleware, guard layers, the error
//! reporter, configuration and the demo server.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;

pub use authz::RequireGuards;
pub use config::{ApiConfig, ConfigError, CookieOptions, CookieSettings};
pub use context::AuthContext;
