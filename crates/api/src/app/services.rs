//! In-memory identity and role data backing the demo routes.

use std::collections::HashMap;
use std::sync::Arc;

use gatehouse_auth::{
    IdentityId, IdentityRecord, InMemoryRoleStore, PermissionSet, Role, RoleRecord, RoleValue,
    TokenCodec,
};

use crate::config::CookieSettings;

/// A demo account: an identity record plus its password.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub record: IdentityRecord,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    by_email: HashMap<String, UserAccount>,
}

impl UserDirectory {
    pub fn new(accounts: impl IntoIterator<Item = UserAccount>) -> Self {
        Self {
            by_email: accounts
                .into_iter()
                .map(|a| (a.record.email.clone(), a))
                .collect(),
        }
    }

    pub fn find_by_email(&self, email: &str) -> Option<&UserAccount> {
        self.by_email.get(email)
    }
}

pub struct AppServices {
    pub users: UserDirectory,
    pub roles: InMemoryRoleStore,
    pub codec: Arc<dyn TokenCodec>,
    pub cookie: Option<Arc<CookieSettings>>,
}

pub fn build_services(
    codec: Arc<dyn TokenCodec>,
    cookie: Option<Arc<CookieSettings>>,
) -> AppServices {
    AppServices {
        users: demo_users(),
        roles: demo_roles(),
        codec,
        cookie,
    }
}

const DEMO_PASSWORD: &str = "P@ssw0rd";

fn account(id: &str, email: &str, role: RoleValue) -> UserAccount {
    UserAccount {
        record: IdentityRecord {
            id: IdentityId::from(id),
            email: email.to_string(),
            role,
            permissions: None,
        },
        password: DEMO_PASSWORD.to_string(),
    }
}

/// One account per supported role shape.
pub fn demo_users() -> UserDirectory {
    let admin_and_mod = [Role::new("Admin"), Role::new("Moderator")];
    UserDirectory::new([
        account("1", "guest@example.com", RoleValue::Absent),
        account("2", "user@example.com", RoleValue::Single(Role::new("User"))),
        account("3", "mod@example.com", RoleValue::Single(Role::new("Moderator"))),
        account("4", "admin@example.com", RoleValue::Single(Role::new("Admin"))),
        account(
            "5",
            "admin-array@example.com",
            RoleValue::List(admin_and_mod.to_vec()),
        ),
        account(
            "6",
            "admin-map@example.com",
            RoleValue::Map(admin_and_mod.into_iter().map(|r| (r, true)).collect()),
        ),
    ])
}

pub fn demo_roles() -> InMemoryRoleStore {
    fn grants(names: &[&'static str]) -> PermissionSet {
        names.iter().map(|n| (*n, true)).collect()
    }

    InMemoryRoleStore::new([
        RoleRecord {
            name: Role::new("Admin"),
            permissions: grants(&["viewData", "admin"]),
        },
        RoleRecord {
            name: Role::new("Moderator"),
            permissions: grants(&["viewData", "mod"]),
        },
        RoleRecord {
            name: Role::new("User"),
            permissions: grants(&["viewData"]),
        },
    ])
}
