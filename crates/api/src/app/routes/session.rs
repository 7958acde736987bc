use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use gatehouse_auth::issue_token;

use crate::app::{
    dto::{LoginRequest, LoginResponse},
    errors,
    services::AppServices,
};

/// POST /login - check demo credentials and issue a signed token.
///
/// When a cookie source is configured the token is also set as the auth cookie.
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    let account = match services.users.find_by_email(&body.email) {
        Some(account) if account.password == body.password => account,
        _ => {
            tracing::debug!(email = %body.email, "rejected login");
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                "Invalid Credentials!",
            );
        }
    };

    let (payload, token) =
        match issue_token(&account.record, &services.roles, services.codec.as_ref()).await {
            Ok(issued) => issued,
            Err(e) => return errors::issue_error_to_response(e),
        };

    let jar = match services.cookie.as_deref() {
        Some(settings) => jar.add(settings.cookie(token.clone())),
        None => jar,
    };

    let body = LoginResponse {
        success: "Credentials Accepted!",
        auth_payload: payload,
        auth_token: token,
    };

    (jar, (StatusCode::OK, Json(body))).into_response()
}
