//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: in-memory user and role data behind the demo routes
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: the error reporter (consistent JSON error responses)

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use gatehouse_auth::{Hs256TokenCodec, TokenCodec, TokenError};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> Result<Router, TokenError> {
    let codec: Arc<dyn TokenCodec> =
        Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes(), config.token_ttl)?);
    let cookie = config.cookie.clone().map(Arc::new);

    let auth_state = middleware::AuthState {
        codec: codec.clone(),
        cookie: cookie.clone(),
    };
    let services = Arc::new(services::build_services(codec, cookie));

    Ok(routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
    ))
}
