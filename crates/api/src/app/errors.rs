use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use gatehouse_auth::{AuthorizationError, IssueError};

/// Error reporter for guard rejections.
pub fn authorization_error_to_response(err: AuthorizationError) -> axum::response::Response {
    match err {
        AuthorizationError::Unauthenticated(msg) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg)
        }
        AuthorizationError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
    }
}

pub fn issue_error_to_response(err: IssueError) -> axum::response::Response {
    tracing::error!(error = %err, "credential issuance failed");
    match err {
        IssueError::Lookup(e) => json_error(StatusCode::BAD_GATEWAY, "lookup_error", e.to_string()),
        IssueError::Token(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
