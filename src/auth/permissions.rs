use once_cell::sync::Lazy;
use rocket::serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageOwnRoster,
    ChangeOwnPassword,

    ManageAnyRoster,
    ManageCoaches,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coach,
    Admin,
}

static COACH_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ManageOwnRoster);
    permissions.insert(Permission::ChangeOwnPassword);

    permissions
});

static ADMIN_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(COACH_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ManageAnyRoster);
    permissions.insert(Permission::ManageCoaches);

    permissions
});

impl Role {
    pub fn from_admin_flag(admin: bool) -> Self {
        if admin { Role::Admin } else { Role::Coach }
    }

    pub fn permissions(&self) -> &'static HashSet<Permission> {
        match self {
            Role::Coach => &COACH_PERMISSIONS,
            Role::Admin => &ADMIN_PERMISSIONS,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Coach => "coach",
            Role::Admin => "admin",
        }
    }

    /// Where a freshly logged-in principal of this role lands.
    pub fn landing_route(&self) -> &'static str {
        match self {
            Role::Coach => "/coach/",
            Role::Admin => "/admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
