//! Roles and the role → permission table

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// User roles known to the stock workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Driver,
    #[serde(rename = "siteworker")]
    SiteWorker,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Staff,
        Role::Driver,
        Role::SiteWorker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Driver => "driver",
            Role::SiteWorker => "siteworker",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidRole(s.to_string()))
    }
}

/// Actions guarded by role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewInventory,
    ManageInventory,
    RequestStock,
    ApproveRequests,
    DispatchStock,
    ConfirmDelivery,
    ViewAlerts,
    ManageAlerts,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::ViewInventory,
        Permission::ManageInventory,
        Permission::RequestStock,
        Permission::ApproveRequests,
        Permission::DispatchStock,
        Permission::ConfirmDelivery,
        Permission::ViewAlerts,
        Permission::ManageAlerts,
    ];
}

/// Role → permission mapping, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct PermissionTable {
    grants: HashMap<Role, HashSet<Permission>>,
}

impl PermissionTable {
    /// Built-in grants
    pub fn with_defaults() -> Self {
        use Permission::*;

        let mut grants = HashMap::new();
        grants.insert(Role::Admin, Permission::ALL.into_iter().collect());
        grants.insert(
            Role::Manager,
            [
                ViewInventory,
                ManageInventory,
                RequestStock,
                ApproveRequests,
                DispatchStock,
                ViewAlerts,
                ManageAlerts,
            ]
            .into_iter()
            .collect(),
        );
        grants.insert(
            Role::Staff,
            [ViewInventory, ManageInventory, RequestStock, ViewAlerts]
                .into_iter()
                .collect(),
        );
        grants.insert(
            Role::Driver,
            [ViewInventory, ConfirmDelivery].into_iter().collect(),
        );
        grants.insert(
            Role::SiteWorker,
            [ViewInventory, RequestStock, ConfirmDelivery]
                .into_iter()
                .collect(),
        );
        Self { grants }
    }

    /// Defaults with per-role replacements; an override replaces the role's whole set
    pub fn with_overrides(
        overrides: &HashMap<String, Vec<Permission>>,
    ) -> Result<Self, DomainError> {
        let mut table = Self::with_defaults();
        for (role_name, permissions) in overrides {
            let role = Role::parse(role_name)?;
            table
                .grants
                .insert(role, permissions.iter().copied().collect());
        }
        Ok(table)
    }

    pub fn allows(&self, role: Role, permission: Permission) -> bool {
        self.grants
            .get(&role)
            .is_some_and(|set| set.contains(&permission))
    }

    /// Permissions granted to a role, in declaration order
    pub fn permissions_for(&self, role: Role) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.allows(role, *p))
            .collect()
    }
}

impl Default for PermissionTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}
