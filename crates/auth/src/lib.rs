//! `gatehouse-auth` — authorization decision core.
//!
//! Resolves a caller's identity from a signed token, normalizes the role
//! shapes an identity may carry, merges permission grants at issuance, and
//! evaluates fail-fast guard chains. This crate is decoupled from HTTP and
//! from storage; role data arrives through the [`RoleLookup`] trait.

pub mod guards;
pub mod identity;
pub mod issue;
pub mod lookup;
pub mod permissions;
pub mod resolve;
pub mod roles;
pub mod token;

pub use guards::{
    AuthorizationError, Guard, GuardChain, has_any_role, has_permission, has_role, is_logged_in,
};
pub use identity::{IdentityContext, IdentityId, IdentityRecord};
pub use issue::{IssueError, issue_identity, issue_token};
pub use lookup::{InMemoryRoleStore, LookupError, RoleLookup, RoleRecord, resolve_roles};
pub use permissions::{Permission, PermissionSet, merge_permissions};
pub use resolve::{Resolution, resolve_identity};
pub use roles::{Role, RoleSet, RoleValue, normalize};
pub use token::{Hs256TokenCodec, TokenCodec, TokenError};
