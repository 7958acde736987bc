//! Route-level guard installation.
//!
//! A route's guards run after the auth middleware has attached the
//! [`AuthContext`] and before the handler. The first rejection is turned into
//! the error response; the handler never runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::MethodRouter,
};

use gatehouse_auth::GuardChain;

use crate::app::errors;
use crate::context::AuthContext;

pub async fn guard_middleware(
    State(chain): State<Arc<GuardChain>>,
    req: Request,
    next: Next,
) -> Response {
    let outcome = chain.evaluate(
        req.extensions()
            .get::<AuthContext>()
            .and_then(AuthContext::identity),
    );

    match outcome {
        Ok(()) => next.run(req).await,
        Err(e) => errors::authorization_error_to_response(e),
    }
}

/// Put a guard chain in front of a route.
///
/// ```ignore
/// Router::new().route("/admin", get(handler).require(has_role(["Admin"])));
/// ```
pub trait RequireGuards {
    fn require(self, chain: impl Into<GuardChain>) -> Self;
}

impl<S> RequireGuards for MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn require(self, chain: impl Into<GuardChain>) -> Self {
        self.route_layer(from_fn_with_state(Arc::new(chain.into()), guard_middleware))
    }
}
