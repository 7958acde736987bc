//! Authorization guards and the fail-fast guard chain.
//!
//! Guards are stateless predicates over the identity attached to a request.
//! They never look anything up: roles are normalized from the carried role
//! shape and permissions are read from the table frozen at issuance.

use thiserror::Error;

use crate::{IdentityContext, Permission, Role};

const NOT_LOGGED_IN: &str = "You are not logged in!";
const NO_ROLE: &str = "You have not been assigned a role!";
const NO_PERMISSIONS: &str = "You do not have any permissions!";

/// Rejection produced by a guard. Terminal for the current chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No identity could be established (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// An identity exists but lacks the required role or permission (403).
    #[error("{0}")]
    Forbidden(String),
}

impl AuthorizationError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated(NOT_LOGGED_IN.to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// HTTP status carried by this rejection.
    pub fn status(&self) -> u16 {
        match self {
            AuthorizationError::Unauthenticated(_) => 401,
            AuthorizationError::Forbidden(_) => 403,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuthorizationError::Unauthenticated(m) | AuthorizationError::Forbidden(m) => m,
        }
    }
}

/// A single authorization check.
///
/// With an empty argument list, `HasRole` and `HasPermission` degrade into
/// existence checks ("has any role", "has any permission").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    IsLoggedIn,
    HasAnyRole,
    HasRole(Vec<Role>),
    HasPermission(Vec<Permission>),
}

pub fn is_logged_in() -> Guard {
    Guard::IsLoggedIn
}

pub fn has_any_role() -> Guard {
    Guard::HasAnyRole
}

pub fn has_role<I, R>(allowed: I) -> Guard
where
    I: IntoIterator<Item = R>,
    R: Into<Role>,
{
    Guard::HasRole(allowed.into_iter().map(Into::into).collect())
}

pub fn has_permission<I, P>(allowed: I) -> Guard
where
    I: IntoIterator<Item = P>,
    P: Into<Permission>,
{
    Guard::HasPermission(allowed.into_iter().map(Into::into).collect())
}

impl Guard {
    /// Check the request's identity (if any).
    ///
    /// - No IO
    /// - No panics
    /// - Checks run in a fixed order: identity, role/permission presence,
    ///   then membership.
    pub fn check(&self, identity: Option<&IdentityContext>) -> Result<(), AuthorizationError> {
        let Some(identity) = identity else {
            return Err(AuthorizationError::unauthenticated());
        };

        match self {
            Guard::IsLoggedIn => Ok(()),
            Guard::HasAnyRole => {
                if identity.role.is_absent() || identity.roles().is_empty() {
                    return Err(AuthorizationError::forbidden(NO_ROLE));
                }
                Ok(())
            }
            Guard::HasRole(allowed) => {
                if identity.role.is_absent() {
                    return Err(AuthorizationError::forbidden(missing_role_message(allowed)));
                }
                let roles = identity.roles();
                let ok = if allowed.is_empty() {
                    !roles.is_empty()
                } else {
                    roles.intersects(allowed)
                };
                if ok {
                    Ok(())
                } else {
                    Err(AuthorizationError::forbidden(missing_role_message(allowed)))
                }
            }
            Guard::HasPermission(allowed) => {
                let Some(permissions) = identity.permissions.as_ref() else {
                    return Err(AuthorizationError::forbidden(NO_PERMISSIONS));
                };
                let ok = if allowed.is_empty() {
                    permissions.has_any_grant()
                } else {
                    allowed.iter().any(|p| permissions.is_granted(p))
                };
                if ok {
                    Ok(())
                } else {
                    Err(AuthorizationError::forbidden(missing_permission_message(allowed)))
                }
            }
        }
    }
}

impl core::fmt::Display for Guard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Guard::IsLoggedIn => f.write_str("isLoggedIn()"),
            Guard::HasAnyRole => f.write_str("hasAnyRole()"),
            Guard::HasRole(roles) => write!(f, "hasRole({})", join(roles)),
            Guard::HasPermission(perms) => write!(f, "hasPermission({})", join(perms)),
        }
    }
}

fn join<T: core::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn missing_role_message(allowed: &[Role]) -> String {
    match allowed {
        [] => NO_ROLE.to_string(),
        [only] => format!("You do not have the {only} role!"),
        _ => format!("You do not have one of the allowed roles: {}!", join(allowed)),
    }
}

fn missing_permission_message(allowed: &[Permission]) -> String {
    match allowed {
        [] => NO_PERMISSIONS.to_string(),
        [only] => format!("You do not have permission {only}!"),
        _ => format!("You do not have any of the permissions: {}!", join(allowed)),
    }
}

/// Ordered sequence of guards installed in front of one protected operation.
///
/// Evaluation stops at the first rejection; later guards never run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardChain {
    guards: Vec<Guard>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a guard to the end of the chain.
    pub fn then(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    pub fn evaluate(&self, identity: Option<&IdentityContext>) -> Result<(), AuthorizationError> {
        for guard in &self.guards {
            if let Err(e) = guard.check(identity) {
                tracing::debug!(
                    guard = %guard,
                    status = e.status(),
                    reason = e.message(),
                    "guard rejected request"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

impl From<Guard> for GuardChain {
    fn from(guard: Guard) -> Self {
        Self { guards: vec![guard] }
    }
}

impl FromIterator<Guard> for GuardChain {
    fn from_iter<I: IntoIterator<Item = Guard>>(iter: I) -> Self {
        Self {
            guards: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{IdentityId, PermissionSet, RoleValue};

    fn identity(role: RoleValue, permissions: Option<PermissionSet>) -> IdentityContext {
        IdentityContext {
            id: IdentityId::new("1"),
            email: "someone@example.com".to_string(),
            role,
            permissions,
        }
    }

    fn single(name: &'static str) -> RoleValue {
        RoleValue::Single(Role::new(name))
    }

    fn perms(entries: &[(&'static str, bool)]) -> Option<PermissionSet> {
        Some(entries.iter().copied().collect())
    }

    #[test]
    fn every_guard_rejects_anonymous_with_401() {
        for guard in [
            is_logged_in(),
            has_any_role(),
            has_role(["Admin"]),
            has_role(Vec::<Role>::new()),
            has_permission(["admin"]),
            has_permission(Vec::<Permission>::new()),
        ] {
            let err = guard.check(None).unwrap_err();
            assert_eq!(err.status(), 401, "guard: {guard}");
            assert_eq!(err.message(), "You are not logged in!");
        }
    }

    #[test]
    fn is_logged_in_ignores_role_and_permission_content() {
        let bare = identity(RoleValue::Absent, None);
        assert!(is_logged_in().check(Some(&bare)).is_ok());
    }

    #[test]
    fn has_any_role_rejects_absent_role_with_403() {
        let err = has_any_role()
            .check(Some(&identity(RoleValue::Absent, None)))
            .unwrap_err();
        assert_eq!(err, AuthorizationError::forbidden("You have not been assigned a role!"));
    }

    #[test]
    fn has_any_role_requires_a_non_empty_normalized_set() {
        let empty_list = identity(RoleValue::List(vec![Role::new("")]), None);
        let all_false = identity(
            RoleValue::Map(BTreeMap::from([(Role::new("Admin"), false)])),
            None,
        );
        assert_eq!(has_any_role().check(Some(&empty_list)).unwrap_err().status(), 403);
        assert_eq!(has_any_role().check(Some(&all_false)).unwrap_err().status(), 403);

        assert!(has_any_role().check(Some(&identity(single("User"), None))).is_ok());
    }

    #[test]
    fn has_role_accepts_every_role_shape() {
        let guard = has_role(["Admin", "Moderator"]);
        let shapes = [
            RoleValue::List(vec![Role::new("Admin")]),
            RoleValue::Map(BTreeMap::from([(Role::new("Admin"), true)])),
            single("Admin"),
        ];

        for shape in shapes {
            assert!(guard.check(Some(&identity(shape.clone(), None))).is_ok(), "{shape:?}");
        }
    }

    #[test]
    fn has_role_rejection_names_the_required_roles() {
        let err = has_role(["Admin", "Moderator"])
            .check(Some(&identity(single("User"), None)))
            .unwrap_err();

        assert_eq!(err.status(), 403);
        assert!(err.message().contains("Admin"));
        assert!(err.message().contains("Moderator"));
    }

    #[test]
    fn has_role_with_absent_role_is_403() {
        let err = has_role(["Admin"])
            .check(Some(&identity(RoleValue::Absent, None)))
            .unwrap_err();
        assert_eq!(err, AuthorizationError::forbidden("You do not have the Admin role!"));
    }

    #[test]
    fn has_role_without_arguments_is_an_existence_check() {
        let guard = has_role(Vec::<Role>::new());
        assert!(guard.check(Some(&identity(single("Anything"), None))).is_ok());

        let none_true = identity(
            RoleValue::Map(BTreeMap::from([(Role::new("Admin"), false)])),
            None,
        );
        assert_eq!(guard.check(Some(&none_true)).unwrap_err().status(), 403);
    }

    #[test]
    fn has_role_ignores_map_entries_set_to_false() {
        let ctx = identity(
            RoleValue::Map(BTreeMap::from([
                (Role::new("Admin"), false),
                (Role::new("User"), true),
            ])),
            None,
        );
        assert!(has_role(["Admin"]).check(Some(&ctx)).is_err());
        assert!(has_role(["User"]).check(Some(&ctx)).is_ok());
    }

    #[test]
    fn has_permission_without_arguments_needs_one_grant() {
        let guard = has_permission(Vec::<Permission>::new());

        assert!(guard.check(Some(&identity(RoleValue::Absent, perms(&[("x", true)])))).is_ok());

        let err = guard
            .check(Some(&identity(RoleValue::Absent, perms(&[]))))
            .unwrap_err();
        assert_eq!(err.status(), 403);

        let only_false = identity(RoleValue::Absent, perms(&[("x", false)]));
        assert_eq!(guard.check(Some(&only_false)).unwrap_err().status(), 403);
    }

    #[test]
    fn has_permission_rejects_missing_table_with_403() {
        let err = has_permission(["viewData"])
            .check(Some(&identity(single("User"), None)))
            .unwrap_err();
        assert_eq!(err, AuthorizationError::forbidden("You do not have any permissions!"));
    }

    #[test]
    fn has_permission_accepts_any_listed_grant() {
        let ctx = identity(RoleValue::Absent, perms(&[("mod", true), ("admin", false)]));

        assert!(has_permission(["admin", "mod"]).check(Some(&ctx)).is_ok());

        let err = has_permission(["admin"]).check(Some(&ctx)).unwrap_err();
        assert_eq!(err, AuthorizationError::forbidden("You do not have permission admin!"));

        let err = has_permission(["admin", "root"]).check(Some(&ctx)).unwrap_err();
        assert!(err.message().contains("admin") && err.message().contains("root"));
    }

    #[test]
    fn chain_is_fail_fast() {
        let chain: GuardChain = [has_any_role(), has_permission(["admin"])].into_iter().collect();
        let ctx = identity(RoleValue::Absent, None);

        let err = chain.evaluate(Some(&ctx)).unwrap_err();

        // The role guard's rejection, not the permission guard's.
        assert_eq!(err, AuthorizationError::forbidden("You have not been assigned a role!"));
    }

    #[test]
    fn chain_passes_when_every_guard_passes() {
        let chain = GuardChain::new()
            .then(is_logged_in())
            .then(has_role(["Admin"]))
            .then(has_permission(["admin"]));
        let ctx = identity(single("Admin"), perms(&[("admin", true)]));

        assert!(chain.evaluate(Some(&ctx)).is_ok());
        assert!(GuardChain::new().evaluate(None).is_ok());
    }

    #[test]
    fn permissions_are_not_recomputed_from_roles() {
        // Role grants are only merged at issuance; an Admin role alone grants nothing here.
        let ctx = identity(single("Admin"), perms(&[]));
        assert!(has_permission(["admin"]).check(Some(&ctx)).is_err());
    }

    #[test]
    fn guards_render_readably() {
        assert_eq!(has_role(["Admin", "Moderator"]).to_string(), "hasRole(Admin, Moderator)");
        assert_eq!(GuardChain::from(is_logged_in()).guards(), &[Guard::IsLoggedIn]);
    }
}
