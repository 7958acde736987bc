use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use gatehouse_auth::{Resolution, TokenCodec, resolve_identity};

use crate::config::CookieSettings;
use crate::context::AuthContext;

#[derive(Clone)]
pub struct AuthState {
    pub codec: Arc<dyn TokenCodec>,
    pub cookie: Option<Arc<CookieSettings>>,
}

/// Resolve the caller's identity and attach an [`AuthContext`] to the request.
///
/// Never rejects: a missing or bad credential leaves the context empty and
/// the route's guards decide. A request authenticated by the auth cookie gets
/// the cookie re-set when refresh is enabled.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_token = state
        .cookie
        .as_ref()
        .and_then(|settings| jar.get(&settings.name))
        .map(|c| c.value().to_string());

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let resolution = resolve_identity(authorization, cookie_token.as_deref(), state.codec.as_ref());

    let refreshed = match (&resolution, state.cookie.as_deref(), cookie_token) {
        (Resolution::Cookie(identity), Some(settings), Some(token)) if settings.refresh => {
            tracing::debug!(identity_id = %identity.id, cookie = %settings.name, "refreshing auth cookie");
            Some(settings.cookie(token))
        }
        _ => None,
    };

    req.extensions_mut()
        .insert(AuthContext::new(resolution.into_identity()));

    let response = next.run(req).await;

    match refreshed {
        Some(cookie) => (jar.add(cookie), response).into_response(),
        None => response,
    }
}
