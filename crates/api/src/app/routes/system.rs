use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, Uri},
    response::Response,
};

use crate::app::{dto::MessageResponse, errors};
use crate::context::AuthContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn home() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Server Running.",
    })
}

/// Echo the identity attached to this request.
///
/// Mounted behind `is_logged_in()`, so the context always carries an identity;
/// an anonymous context renders as `null`.
pub async fn whoami(Extension(auth): Extension<AuthContext>) -> Json<serde_json::Value> {
    Json(auth.identity().map_or(serde_json::Value::Null, |identity| {
        serde_json::json!({
            "id": identity.id,
            "email": identity.email,
            "role": identity.role,
            "roles": identity.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            "permissions": identity.permissions,
        })
    }))
}

pub async fn not_found(uri: Uri) -> Response {
    errors::json_error(
        StatusCode::NOT_FOUND,
        "not_found",
        format!("{} not found!", uri.path()),
    )
}

#[cfg(test)]
mod tests {
    use gatehouse_auth::{IdentityContext, IdentityId, Role, RoleValue};

    use super::*;

    #[tokio::test]
    async fn whoami_echoes_the_attached_identity() {
        let identity = IdentityContext {
            id: IdentityId::new("5"),
            email: "admin-array@example.com".to_string(),
            role: RoleValue::List(vec![Role::new("Moderator"), Role::new("Admin")]),
            permissions: Some([("viewData", true)].into_iter().collect()),
        };

        let Json(body) = whoami(Extension(AuthContext::new(Some(identity)))).await;

        assert_eq!(body["id"], "5");
        assert_eq!(body["role"], serde_json::json!(["Moderator", "Admin"]));
        assert_eq!(body["roles"], serde_json::json!(["Admin", "Moderator"]));
        assert_eq!(body["permissions"], serde_json::json!({ "viewData": true }));
    }

    #[tokio::test]
    async fn whoami_renders_anonymous_context_as_null() {
        let Json(body) = whoami(Extension(AuthContext::anonymous())).await;
        assert!(body.is_null());
    }
}
