use axum::{
    Router,
    routing::{get, post},
};

use gatehouse_auth::is_logged_in;

use crate::authz::RequireGuards;

pub mod demo;
pub mod session;
pub mod system;

/// Router for every endpoint. Guards are installed per route.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::home))
        .route("/health", get(system::health))
        .route("/login", post(session::login))
        .route("/whoami", get(system::whoami).require(is_logged_in()))
        .nest("/auth", demo::router())
        .fallback(system::not_found)
}
