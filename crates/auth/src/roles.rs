use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role identifier used for RBAC.
///
/// Roles are opaque strings at this layer; mapping a role to its permission
/// grants is the job of a [`RoleLookup`](crate::RoleLookup) collaborator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Role {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The role field of an identity, in whatever shape the data source stored it.
///
/// On the wire this is `null` (or missing), a string, an array of strings, or an
/// object of `name -> bool`. The shape is carried verbatim inside issued tokens.
///
/// Decoding never rejects a payload over its role content: non-string list
/// entries are dropped, map values other than `true` decode as `false`, and
/// any other JSON shape decodes as [`RoleValue::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RoleValue {
    #[default]
    Absent,
    Single(Role),
    List(Vec<Role>),
    Map(BTreeMap<Role, bool>),
}

impl RoleValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, RoleValue::Absent)
    }

    /// Canonical role names for this value (see [`normalize`]).
    pub fn normalize(&self) -> RoleSet {
        normalize(self)
    }
}

/// Everything a role field may hold on the wire.
#[derive(Deserialize)]
#[serde(untagged)]
enum WireRoleValue {
    Absent,
    Single(Role),
    List(Vec<Value>),
    Map(BTreeMap<Role, Value>),
    Other(IgnoredAny),
}

impl From<WireRoleValue> for RoleValue {
    fn from(wire: WireRoleValue) -> Self {
        match wire {
            WireRoleValue::Absent | WireRoleValue::Other(_) => RoleValue::Absent,
            WireRoleValue::Single(name) => RoleValue::Single(name),
            WireRoleValue::List(entries) => RoleValue::List(
                entries
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Value::String(name) => Some(Role::from(name)),
                        _ => None,
                    })
                    .collect(),
            ),
            WireRoleValue::Map(flags) => RoleValue::Map(
                flags
                    .into_iter()
                    .map(|(name, flag)| (name, matches!(flag, Value::Bool(true))))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for RoleValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireRoleValue::deserialize(deserializer).map(RoleValue::from)
    }
}

impl From<Role> for RoleValue {
    fn from(value: Role) -> Self {
        RoleValue::Single(value)
    }
}

impl From<Vec<Role>> for RoleValue {
    fn from(value: Vec<Role>) -> Self {
        RoleValue::List(value)
    }
}

impl From<BTreeMap<Role, bool>> for RoleValue {
    fn from(value: BTreeMap<Role, bool>) -> Self {
        RoleValue::Map(value)
    }
}

/// Deduplicated, order-independent set of role names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn contains(&self, role: &Role) -> bool {
        self.0.contains(role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    /// True when at least one of `roles` is a member of this set.
    pub fn intersects(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.0.contains(r))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for RoleSet {
    type Item = Role;
    type IntoIter = std::collections::btree_set::IntoIter<Role>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Reduce any [`RoleValue`] shape to its canonical set of role names.
///
/// - `Absent` yields the empty set.
/// - `Single` yields that name, even when it is empty.
/// - `List` yields every non-empty entry.
/// - `Map` yields the keys mapped to `true`.
pub fn normalize(role: &RoleValue) -> RoleSet {
    match role {
        RoleValue::Absent => RoleSet::default(),
        RoleValue::Single(name) => RoleSet::from_iter([name.clone()]),
        RoleValue::List(names) => names.iter().filter(|n| !n.is_empty()).cloned().collect(),
        RoleValue::Map(flags) => flags
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(name, _)| name.clone())
            .collect(),
    }
}
