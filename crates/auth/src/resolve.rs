//! Request-time token resolution, independent of any HTTP framework.
//!
//! The transport layer hands over the raw `Authorization` header and the value
//! of the auth cookie (if a cookie name is configured); this module decides
//! which one to trust and verifies it.

use crate::{IdentityContext, TokenCodec};

const BEARER: &str = "Bearer";

/// Where a request's identity came from, if anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Verified bearer token from the `Authorization` header.
    Header(IdentityContext),
    /// Verified token from the auth cookie. Eligible for cookie refresh.
    Cookie(IdentityContext),
    /// No usable credential. Not an error.
    Anonymous,
}

impl Resolution {
    pub fn identity(&self) -> Option<&IdentityContext> {
        match self {
            Resolution::Header(identity) | Resolution::Cookie(identity) => Some(identity),
            Resolution::Anonymous => None,
        }
    }

    pub fn into_identity(self) -> Option<IdentityContext> {
        match self {
            Resolution::Header(identity) | Resolution::Cookie(identity) => Some(identity),
            Resolution::Anonymous => None,
        }
    }

    pub fn is_from_cookie(&self) -> bool {
        matches!(self, Resolution::Cookie(_))
    }
}

/// Resolve the caller's identity.
///
/// A non-empty `Authorization` header is the only source consulted when
/// present, even if it fails to verify. Otherwise the cookie value is tried.
/// Every failure degrades to [`Resolution::Anonymous`].
pub fn resolve_identity(
    authorization: Option<&str>,
    cookie: Option<&str>,
    codec: &dyn TokenCodec,
) -> Resolution {
    if let Some(header) = authorization.filter(|h| !h.is_empty()) {
        return match bearer_token(header) {
            Some(token) => verify(token, codec).map_or(Resolution::Anonymous, Resolution::Header),
            None => Resolution::Anonymous,
        };
    }

    if let Some(token) = cookie.filter(|c| !c.is_empty()) {
        return verify(token, codec).map_or(Resolution::Anonymous, Resolution::Cookie);
    }

    Resolution::Anonymous
}

/// Split `"<scheme> <token>"` on the first space and accept only `Bearer`.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, rest) = match header.find(' ') {
        Some(space) if space > 0 => (&header[..space], &header[space + 1..]),
        _ => {
            tracing::debug!("malformed authorization header");
            return None;
        }
    };

    if scheme != BEARER {
        tracing::debug!(scheme, "unsupported auth type");
        return None;
    }

    Some(rest.trim())
}

fn verify(token: &str, codec: &dyn TokenCodec) -> Option<IdentityContext> {
    match codec.verify(token) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, "invalid token");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{Hs256TokenCodec, IdentityId, Permission, Role, RoleValue};

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new("s3cret", Duration::minutes(10)).unwrap()
    }

    fn identity(id: &str) -> IdentityContext {
        IdentityContext {
            id: IdentityId::new(id),
            email: format!("{id}@example.com"),
            role: RoleValue::Single(Role::new("User")),
            permissions: Some([("viewData", true)].into_iter().collect()),
        }
    }

    fn token_for(id: &str) -> String {
        codec().sign(&identity(id)).unwrap()
    }

    fn sign_raw(mut claims: serde_json::Value) -> String {
        let now = chrono::Utc::now();
        claims["iat"] = serde_json::json!(now.timestamp());
        claims["exp"] = serde_json::json!((now + Duration::minutes(10)).timestamp());
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap()
    }

    #[test]
    fn bearer_header_resolves() {
        let header = format!("Bearer {}", token_for("h"));
        let resolved = resolve_identity(Some(header.as_str()), None, &codec());
        assert_eq!(resolved, Resolution::Header(identity("h")));
    }

    #[test]
    fn surrounding_whitespace_after_scheme_is_trimmed() {
        let header = format!("Bearer   {}  ", token_for("h"));
        let resolved = resolve_identity(Some(header.as_str()), None, &codec());
        assert_eq!(resolved.identity().map(|i| i.id.as_str()), Some("h"));
    }

    #[test]
    fn header_wins_over_cookie() {
        let header = format!("Bearer {}", token_for("header"));
        let cookie = token_for("cookie");

        let resolved = resolve_identity(Some(header.as_str()), Some(cookie.as_str()), &codec());
        assert_eq!(resolved, Resolution::Header(identity("header")));
    }

    #[test]
    fn failing_header_does_not_fall_back_to_cookie() {
        let cookie = token_for("cookie");
        let resolved = resolve_identity(Some("Bearer garbage"), Some(cookie.as_str()), &codec());
        assert_eq!(resolved, Resolution::Anonymous);
    }

    #[test]
    fn non_bearer_schemes_are_anonymous() {
        let token = token_for("h");
        for header in [format!("Basic {token}"), format!("bearer {token}"), token.clone()] {
            assert_eq!(
                resolve_identity(Some(header.as_str()), None, &codec()),
                Resolution::Anonymous,
                "header: {header}"
            );
        }
        assert_eq!(
            resolve_identity(Some(format!(" {token}").as_str()), None, &codec()),
            Resolution::Anonymous
        );
    }

    #[test]
    fn empty_header_falls_through_to_cookie() {
        let cookie = token_for("cookie");
        let resolved = resolve_identity(Some(""), Some(cookie.as_str()), &codec());
        assert!(resolved.is_from_cookie());
    }

    #[test]
    fn cookie_resolves_when_no_header() {
        let cookie = token_for("cookie");
        let resolved = resolve_identity(None, Some(cookie.as_str()), &codec());
        assert_eq!(resolved, Resolution::Cookie(identity("cookie")));
    }

    #[test]
    fn wrong_secret_yields_anonymous() {
        let other = Hs256TokenCodec::new("other", Duration::minutes(10)).unwrap();
        let header = format!("Bearer {}", other.sign(&identity("x")).unwrap());
        let cookie = other.sign(&identity("y")).unwrap();

        assert_eq!(resolve_identity(Some(header.as_str()), None, &codec()), Resolution::Anonymous);
        assert_eq!(resolve_identity(None, Some(cookie.as_str()), &codec()), Resolution::Anonymous);
    }

    #[test]
    fn loose_role_and_permission_values_still_authenticate() {
        let token = sign_raw(serde_json::json!({
            "id": "7",
            "email": "loose@example.com",
            "role": { "Admin": true, "Editor": "yes" },
            "permissions": { "viewData": 1, "admin": true },
        }));
        let header = format!("Bearer {token}");

        let resolved = resolve_identity(Some(header.as_str()), None, &codec());
        let identity = resolved.identity().expect("verifiable token authenticates");

        let roles = identity.roles();
        assert_eq!(roles.iter().map(Role::as_str).collect::<Vec<_>>(), vec!["Admin"]);
        let permissions = identity.permissions.as_ref().unwrap();
        assert!(permissions.is_granted(&Permission::new("admin")));
        assert!(!permissions.is_granted(&Permission::new("viewData")));
    }

    #[test]
    fn null_list_entries_do_not_reject_the_token() {
        let token = sign_raw(serde_json::json!({
            "id": "8",
            "email": "list@example.com",
            "role": ["Admin", null],
        }));

        let resolved = resolve_identity(None, Some(token.as_str()), &codec());
        let identity = resolved.identity().expect("verifiable token authenticates");
        assert_eq!(identity.roles().len(), 1);
        assert!(crate::is_logged_in().check(Some(identity)).is_ok());
    }

    #[test]
    fn nothing_presented_is_anonymous() {
        let resolved = resolve_identity(None, None, &codec());
        assert_eq!(resolved, Resolution::Anonymous);
        assert!(resolved.into_identity().is_none());
    }
}
