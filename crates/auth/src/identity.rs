use serde::{Deserialize, Serialize};

use crate::{PermissionSet, RoleValue};

/// Identifier of an identity as the user/credential store knows it.
///
/// Opaque at this layer: numeric ids from a data source are carried as their
/// decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IdentityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An identity as stored by the upstream data source, before issuance.
///
/// `permissions` holds the identity's own grants; role grants are merged in at
/// issuance time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: IdentityId,
    pub email: String,
    #[serde(default, skip_serializing_if = "RoleValue::is_absent")]
    pub role: RoleValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
}

/// Verified identity attached to a single request.
///
/// This is the payload of an issued token. `role` keeps the exact shape the
/// identity record had; `permissions` is the merged table computed at issuance
/// and is never recomputed while the token is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContext {
    pub id: IdentityId,
    pub email: String,
    #[serde(default, skip_serializing_if = "RoleValue::is_absent")]
    pub role: RoleValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
}

impl IdentityContext {
    /// Canonical role names, recomputed from the carried role shape.
    pub fn roles(&self) -> crate::RoleSet {
        self.role.normalize()
    }
}
