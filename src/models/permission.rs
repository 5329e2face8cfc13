use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::models::{role::Role, user::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    DonationCreate,
    DonationReadOwn,
    DonationBrowse,

    RequestCreate,
    RequestDecide,
    RequestWithdraw,
    RequestReadAll,

    UsersRead,
    UsersApprove,

    StatsRead,
    ReportRead,
}

/// The only place where a role is turned into capabilities.
pub fn role_permissions(role: Role) -> HashSet<Permission> {
    let permissions: &[Permission] = match role {
        Role::Donor => &[
            Permission::DonationCreate,
            Permission::DonationReadOwn,
            Permission::RequestDecide,
        ],
        Role::Ngo => &[
            Permission::DonationBrowse,
            Permission::RequestCreate,
            Permission::RequestWithdraw,
        ],
        Role::Admin => &[
            Permission::DonationBrowse,
            Permission::RequestReadAll,
            Permission::UsersRead,
            Permission::UsersApprove,
            Permission::StatsRead,
            Permission::ReportRead,
        ],
    };
    permissions.iter().copied().collect()
}

#[derive(Debug, Clone)]
pub struct PermissionContext {
    pub user: User,
    pub effective_permissions: HashSet<Permission>,
}

impl PermissionContext {
    pub fn new(user: User) -> Self {
        let effective_permissions = role_permissions(user.role);
        Self {
            user,
            effective_permissions,
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }
}

pub trait PermissionChecker {
    fn has_permission(&self, permission: &Permission) -> bool;
    fn is_owner(&self, owner_id: i64) -> bool;

    fn check_permission(&self, permission: &Permission) -> Result<()>;
    fn check_owner(&self, owner_id: i64) -> Result<()>;
}

impl PermissionChecker for PermissionContext {
    fn has_permission(&self, permission: &Permission) -> bool {
        self.effective_permissions.contains(permission)
    }

    fn is_owner(&self, owner_id: i64) -> bool {
        self.user.id == owner_id
    }

    fn check_permission(&self, permission: &Permission) -> Result<()> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(Error::AccessDenied(*permission))
        }
    }

    fn check_owner(&self, owner_id: i64) -> Result<()> {
        if self.is_owner(owner_id) {
            Ok(())
        } else {
            Err(Error::NotOwner)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.org"),
            password_hash: String::new(),
            role,
            organization_name: None,
            contact_number: None,
            address: None,
            is_approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_capabilities_are_disjoint_where_it_matters() {
        let donor = PermissionContext::new(user(1, Role::Donor));
        let ngo = PermissionContext::new(user(2, Role::Ngo));
        let admin = PermissionContext::new(user(3, Role::Admin));

        assert!(donor.has_permission(&Permission::DonationCreate));
        assert!(!donor.has_permission(&Permission::RequestCreate));
        assert!(ngo.has_permission(&Permission::RequestCreate));
        assert!(!ngo.has_permission(&Permission::RequestDecide));
        for ledger_write in [
            Permission::DonationCreate,
            Permission::RequestCreate,
            Permission::RequestDecide,
            Permission::RequestWithdraw,
        ] {
            assert!(!admin.has_permission(&ledger_write));
        }
        assert!(admin.has_permission(&Permission::UsersApprove));
    }

    #[test]
    fn test_check_owner() {
        let donor = PermissionContext::new(user(7, Role::Donor));
        assert!(donor.check_owner(7).is_ok());
        assert!(matches!(donor.check_owner(8), Err(Error::NotOwner)));
        assert!(matches!(
            donor.check_permission(&Permission::UsersApprove),
            Err(Error::AccessDenied(Permission::UsersApprove))
        ));
    }
}
