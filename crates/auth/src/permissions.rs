use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::RoleRecord;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "viewData").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Permission table: `name -> granted`.
///
/// A permission is granted only when present with value `true`; a missing key
/// and an explicit `false` mean the same thing. On decode, any value other than
/// `true` is read as `false`, and a non-object table decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<Permission, bool>);

#[derive(Deserialize)]
#[serde(untagged)]
enum WirePermissionSet {
    Table(BTreeMap<Permission, Value>),
    Other(IgnoredAny),
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match WirePermissionSet::deserialize(deserializer)? {
            WirePermissionSet::Table(table) => table
                .into_iter()
                .map(|(permission, flag)| (permission, matches!(flag, Value::Bool(true))))
                .collect(),
            WirePermissionSet::Other(_) => PermissionSet::new(),
        })
    }
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, permission: Permission, granted: bool) {
        self.0.insert(permission, granted);
    }

    /// Shorthand for `insert(permission, true)`.
    pub fn grant(&mut self, permission: Permission) {
        self.0.insert(permission, true);
    }

    pub fn is_granted(&self, permission: &Permission) -> bool {
        self.0.get(permission).copied().unwrap_or(false)
    }

    /// True when any entry is granted.
    pub fn has_any_grant(&self) -> bool {
        self.0.values().any(|granted| *granted)
    }

    /// Iterate the granted permissions in name order.
    pub fn granted(&self) -> impl Iterator<Item = &Permission> {
        self.0
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(permission, _)| permission)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<P: Into<Permission>> FromIterator<(P, bool)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (P, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(p, g)| (p.into(), g)).collect())
    }
}

/// Merge an identity's own permission table with the tables of its roles.
///
/// Union semantics: every key granted by any source ends up granted, and no
/// source can revoke a grant made by another. Only granted keys are kept, so
/// the result never contains `false` entries.
pub fn merge_permissions(identity: Option<&PermissionSet>, roles: &[RoleRecord]) -> PermissionSet {
    let mut merged = PermissionSet::new();

    let sources = identity.into_iter().chain(roles.iter().map(|r| &r.permissions));
    for table in sources {
        for permission in table.granted() {
            merged.grant(permission.clone());
        }
    }

    merged
}
