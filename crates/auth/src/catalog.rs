//! Static role → permission catalog.
//!
//! The catalog is fixed at build time. Lookups are a single bitset mask and
//! never fail: anything outside the closed enums degrades to "deny".

use serde::Serialize;

use crate::hierarchy::{Rank, RoleHierarchy};
use crate::permissions::Permission as P;
use crate::{Permission, PermissionSet, Role, RoleSet};

const PROPERTY_MANAGER: PermissionSet = PermissionSet::from_slice(&[
    P::DashboardView,
    P::PropertiesView,
    P::PropertiesCreate,
    P::PropertiesEdit,
    P::PropertiesDelete,
    P::UnitsView,
    P::UnitsManage,
    P::TenantsView,
    P::TenantsManage,
    P::LeasesView,
    P::LeasesCreate,
    P::LeasesApprove,
    P::FinancesView,
    P::FinancesCreate,
    P::FinancesApprove,
    P::FinancesExport,
    P::PaymentsView,
    P::PaymentsProcess,
    P::IssuesView,
    P::IssuesCreate,
    P::IssuesAssign,
    P::IssuesResolve,
    P::WorkOrdersView,
    P::WorkOrdersManage,
    P::BidsView,
    P::BidsApprove,
    P::DocumentsView,
    P::DocumentsUpload,
    P::DocumentsDelete,
    P::BoardView,
    P::ReportsView,
    P::ReportsGenerate,
    P::UsersView,
    P::UsersManage,
    P::EmergencyDeclare,
    P::EmergencyRespond,
]);

const BOARD_MEMBER: PermissionSet = PermissionSet::from_slice(&[
    P::DashboardView,
    P::PropertiesView,
    P::UnitsView,
    P::LeasesView,
    P::FinancesView,
    P::FinancesApprove,
    P::IssuesView,
    P::BidsView,
    P::BidsApprove,
    P::DocumentsView,
    P::BoardView,
    P::BoardVote,
    P::ReportsView,
    P::UsersView,
]);

const ACCOUNTANT: PermissionSet = PermissionSet::from_slice(&[
    P::DashboardView,
    P::PropertiesView,
    P::UnitsView,
    P::LeasesView,
    P::FinancesView,
    P::FinancesCreate,
    P::FinancesApprove,
    P::FinancesExport,
    P::PaymentsView,
    P::PaymentsProcess,
    P::DocumentsView,
    P::DocumentsUpload,
    P::ReportsView,
    P::ReportsGenerate,
    P::AuditView,
]);

const OWNER: PermissionSet = PermissionSet::from_slice(&[
    P::DashboardView,
    P::PropertiesView,
    P::UnitsView,
    P::TenantsView,
    P::LeasesView,
    P::FinancesView,
    P::PaymentsView,
    P::IssuesView,
    P::IssuesCreate,
    P::BidsView,
    P::DocumentsView,
    P::BoardView,
    P::ReportsView,
]);

const TENANT: PermissionSet = PermissionSet::from_slice(&[
    P::DashboardView,
    P::UnitsView,
    P::LeasesView,
    P::PaymentsView,
    P::PaymentsProcess,
    P::IssuesView,
    P::IssuesCreate,
    P::DocumentsView,
    P::DocumentsUpload,
]);

const VENDOR: PermissionSet = PermissionSet::from_slice(&[
    P::DashboardView,
    P::IssuesView,
    P::WorkOrdersView,
    P::BidsView,
    P::BidsSubmit,
    P::DocumentsView,
    P::DocumentsUpload,
]);

const EMERGENCY_AGENT: PermissionSet = PermissionSet::from_slice(&[
    P::DashboardView,
    P::PropertiesView,
    P::UnitsView,
    P::TenantsView,
    P::IssuesView,
    P::IssuesCreate,
    P::IssuesAssign,
    P::IssuesResolve,
    P::WorkOrdersView,
    P::WorkOrdersManage,
    P::DocumentsView,
    P::EmergencyDeclare,
    P::EmergencyRespond,
]);

/// Role → permission-set lookups.
pub struct PermissionCatalog;

impl PermissionCatalog {
    /// Permissions granted to `role`.
    pub fn permissions_for(role: Role) -> PermissionSet {
        match role {
            Role::SuperAdmin => PermissionSet::all(),
            Role::PropertyManager => PROPERTY_MANAGER,
            Role::BoardMember => BOARD_MEMBER,
            Role::Accountant => ACCOUNTANT,
            Role::Owner => OWNER,
            Role::Tenant => TENANT,
            Role::Vendor => VENDOR,
            Role::EmergencyAgent => EMERGENCY_AGENT,
        }
    }

    pub fn has_permission(role: Role, permission: Permission) -> bool {
        Self::permissions_for(role).contains(permission)
    }

    pub fn has_any(role: Role, permissions: &[Permission]) -> bool {
        Self::permissions_for(role).contains_any(permissions)
    }

    pub fn has_all(role: Role, permissions: &[Permission]) -> bool {
        Self::permissions_for(role).contains_all(permissions)
    }

    /// String-keyed lookup for callers holding raw ids (config, logs, claims).
    ///
    /// Unknown role or permission ids are a configuration problem: they are
    /// logged and the answer is `false`.
    pub fn has_permission_named(role: &str, permission: &str) -> bool {
        let Some(role_tag) = Role::from_id(role) else {
            tracing::warn!(role, permission, "unknown role id in permission lookup; denying");
            return false;
        };
        let Some(permission_tag) = Permission::from_id(permission) else {
            tracing::warn!(role, permission, "unknown permission id in permission lookup; denying");
            return false;
        };
        Self::has_permission(role_tag, permission_tag)
    }

    /// Permissions granted to the named role; empty (and logged) if unknown.
    pub fn permissions_for_named(role: &str) -> PermissionSet {
        match Role::from_id(role) {
            Some(role) => Self::permissions_for(role),
            None => {
                tracing::warn!(role, "unknown role id in catalog lookup; returning no permissions");
                PermissionSet::empty()
            }
        }
    }

    /// Roles whose catalog entry grants `permission`.
    pub fn roles_granting(permission: Permission) -> RoleSet {
        Role::ALL
            .into_iter()
            .filter(|role| Self::has_permission(*role, permission))
            .collect()
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub role: Role,
    pub rank: Rank,
    pub description: &'static str,
    pub permissions: PermissionSet,
}

/// Permission definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDefinition {
    pub permission: Permission,
    pub category: &'static str,
    pub description: String,
    pub granted_to: RoleSet,
}

/// Complete view of the RBAC catalog, ordered for auditing.
///
/// Roles are listed most privileged first; permissions in ordinal order.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: Vec<RoleDefinition>,
    pub permissions: Vec<PermissionDefinition>,
}

impl RbacRegistry {
    pub fn from_catalog() -> Self {
        let roles = RoleHierarchy::ORDER
            .iter()
            .rev()
            .map(|role| RoleDefinition {
                role: *role,
                rank: RoleHierarchy::rank(*role),
                description: role.description(),
                permissions: PermissionCatalog::permissions_for(*role),
            })
            .collect();

        let permissions = Permission::ALL
            .iter()
            .map(|permission| PermissionDefinition {
                permission: *permission,
                category: permission.category(),
                description: permission_description(*permission),
                granted_to: PermissionCatalog::roles_granting(*permission),
            })
            .collect();

        Self { roles, permissions }
    }
}

fn permission_description(permission: Permission) -> String {
    let resource = permission.category().replace('_', " ");
    let action = match permission.action() {
        "view" => "View",
        "create" => "Create new",
        "edit" => "Edit",
        "delete" => "Delete",
        "manage" => "Create/update/delete",
        "approve" => "Approve",
        "export" => "Export",
        "process" => "Process",
        "assign" => "Assign",
        "resolve" => "Resolve",
        "submit" => "Submit",
        "upload" => "Upload",
        "vote" => "Vote on",
        "generate" => "Generate",
        "declare" => "Declare",
        "respond" => "Respond to",
        other => other,
    };
    format!("{action} {resource}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_granted_permission_is_in_the_closed_set() {
        for role in Role::ALL {
            for permission in PermissionCatalog::permissions_for(role).iter() {
                assert!(Permission::ALL.contains(&permission));
                assert_eq!(Permission::from_id(permission.as_str()), Some(permission));
            }
        }
    }

    #[test]
    fn every_role_can_see_the_dashboard() {
        for role in Role::ALL {
            assert!(PermissionCatalog::has_permission(role, Permission::DashboardView), "{role}");
        }
    }

    #[test]
    fn super_admin_holds_everything() {
        assert!(PermissionCatalog::has_all(Role::SuperAdmin, Permission::ALL));
    }

    #[test]
    fn property_manager_is_not_a_board_voter() {
        assert!(PermissionCatalog::has_permission(Role::PropertyManager, Permission::UsersManage));
        assert!(!PermissionCatalog::has_permission(Role::PropertyManager, Permission::BoardVote));
        assert!(!PermissionCatalog::has_permission(Role::PropertyManager, Permission::SettingsManage));
    }

    #[test]
    fn tenant_cannot_touch_finances() {
        assert!(!PermissionCatalog::has_any(
            Role::Tenant,
            &[Permission::FinancesView, Permission::FinancesApprove]
        ));
        assert!(PermissionCatalog::has_all(
            Role::Tenant,
            &[Permission::IssuesCreate, Permission::PaymentsProcess]
        ));
    }

    #[test]
    fn empty_any_query_is_false_and_empty_all_query_is_true() {
        assert!(!PermissionCatalog::has_any(Role::SuperAdmin, &[]));
        assert!(PermissionCatalog::has_all(Role::Tenant, &[]));
    }

    #[test]
    fn named_lookup_fails_closed() {
        assert!(PermissionCatalog::has_permission_named("accountant", "finances.approve"));
        assert!(!PermissionCatalog::has_permission_named("accountant", "finances.steal"));
        assert!(!PermissionCatalog::has_permission_named("landlord", "dashboard.view"));
        assert!(PermissionCatalog::permissions_for_named("landlord").is_empty());
    }

    #[test]
    fn roles_granting_vote() {
        let voters = PermissionCatalog::roles_granting(Permission::BoardVote);
        assert_eq!(voters.iter().collect::<Vec<_>>(), vec![Role::SuperAdmin, Role::BoardMember]);
    }

    #[test]
    fn registry_lists_roles_most_privileged_first() {
        let registry = RbacRegistry::from_catalog();
        assert_eq!(registry.roles.len(), Role::ALL.len());
        assert_eq!(registry.roles[0].role, Role::SuperAdmin);
        assert_eq!(registry.roles[7].role, Role::Tenant);
        assert_eq!(registry.permissions.len(), Permission::ALL.len());

        let approve = registry
            .permissions
            .iter()
            .find(|p| p.permission == Permission::FinancesApprove)
            .unwrap();
        assert_eq!(approve.category, "finances");
        assert_eq!(approve.description, "Approve finances");
        assert!(approve.granted_to.contains(Role::Accountant));
    }
}
