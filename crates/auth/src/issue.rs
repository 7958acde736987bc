//! Credential issuance: resolve roles, merge permissions, build the payload.

use thiserror::Error;

use crate::{
    IdentityContext, IdentityRecord, LookupError, RoleLookup, TokenCodec, TokenError,
    merge_permissions, resolve_roles,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IssueError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Build the identity context for a freshly authenticated identity.
///
/// The role value is copied verbatim; `permissions` is the union of the
/// identity's own grants and those of every resolved role. Any lookup failure
/// aborts issuance.
pub async fn issue_identity(
    record: &IdentityRecord,
    lookup: &dyn RoleLookup,
) -> Result<IdentityContext, IssueError> {
    let roles = resolve_roles(&record.role, lookup).await?;
    let permissions = merge_permissions(record.permissions.as_ref(), &roles);

    tracing::info!(identity_id = %record.id, roles = roles.len(), "issued identity context");

    Ok(IdentityContext {
        id: record.id.clone(),
        email: record.email.clone(),
        role: record.role.clone(),
        permissions: Some(permissions),
    })
}

/// Issue and sign in one step. Returns the payload alongside its token.
pub async fn issue_token(
    record: &IdentityRecord,
    lookup: &dyn RoleLookup,
    codec: &dyn TokenCodec,
) -> Result<(IdentityContext, String), IssueError> {
    let identity = issue_identity(record, lookup).await?;
    let token = codec.sign(&identity)?;
    Ok((identity, token))
}
