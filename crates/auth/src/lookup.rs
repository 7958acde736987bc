//! Role records and the issuance-time role resolution fan-out.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PermissionSet, Role, RoleValue, normalize};

/// A named role and the permissions it grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub name: Role,
    #[serde(default)]
    pub permissions: PermissionSet,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("role lookup for '{role}' failed: {reason}")]
    Backend { role: Role, reason: String },
}

impl LookupError {
    pub fn backend(role: &Role, reason: impl Into<String>) -> Self {
        Self::Backend {
            role: role.clone(),
            reason: reason.into(),
        }
    }
}

/// Read-only role data source consulted at issuance.
///
/// `Ok(None)` means the role does not exist; an `Err` aborts the issuance.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn find_role_by_name(&self, name: &Role) -> Result<Option<RoleRecord>, LookupError>;
}

/// Resolve an identity's role value into role records.
///
/// One lookup per canonical role name, all in flight at once. Names that do
/// not resolve to a record are dropped. The first failing lookup fails the
/// whole resolution. Output order is unspecified.
pub async fn resolve_roles(
    role: &RoleValue,
    lookup: &dyn RoleLookup,
) -> Result<Vec<RoleRecord>, LookupError> {
    let names = normalize(role);
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let found = try_join_all(names.iter().map(|name| lookup.find_role_by_name(name))).await?;

    let resolved: Vec<RoleRecord> = found.into_iter().flatten().collect();
    tracing::debug!(
        requested = names.len(),
        resolved = resolved.len(),
        "resolved role records"
    );
    Ok(resolved)
}

/// In-memory role table, keyed by role name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoleStore {
    roles: HashMap<Role, RoleRecord>,
}

impl InMemoryRoleStore {
    pub fn new(records: impl IntoIterator<Item = RoleRecord>) -> Self {
        Self {
            roles: records.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    pub fn insert(&mut self, record: RoleRecord) {
        self.roles.insert(record.name.clone(), record);
    }
}

#[async_trait]
impl RoleLookup for InMemoryRoleStore {
    async fn find_role_by_name(&self, name: &Role) -> Result<Option<RoleRecord>, LookupError> {
        Ok(self.roles.get(name).cloned())
    }
}
