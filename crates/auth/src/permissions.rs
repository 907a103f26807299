use core::str::FromStr;

use serde::{Deserialize, Serialize};

use rentwise_core::ValueObject;

use crate::AuthzError;

macro_rules! permissions {
    ($($(#[$doc:meta])* $variant:ident => $id:literal,)+) => {
        /// Permission identifier.
        ///
        /// Closed set of `"<domain>.<action>"` tags. The string ids are stable:
        /// audit logs and route configuration refer to them verbatim.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum Permission {
            $(
                $(#[$doc])*
                #[serde(rename = $id)]
                $variant,
            )+
        }

        impl Permission {
            /// Every permission, in ordinal order.
            pub const ALL: &'static [Permission] = &[$(Permission::$variant,)+];

            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Permission::$variant => $id,)+
                }
            }

            /// Looks up a permission by its stable id.
            pub fn from_id(id: &str) -> Option<Self> {
                match id {
                    $($id => Some(Permission::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

permissions! {
    DashboardView => "dashboard.view",
    PropertiesView => "properties.view",
    PropertiesCreate => "properties.create",
    PropertiesEdit => "properties.edit",
    PropertiesDelete => "properties.delete",
    UnitsView => "units.view",
    UnitsManage => "units.manage",
    TenantsView => "tenants.view",
    TenantsManage => "tenants.manage",
    LeasesView => "leases.view",
    LeasesCreate => "leases.create",
    LeasesApprove => "leases.approve",
    FinancesView => "finances.view",
    FinancesCreate => "finances.create",
    /// Approve expenses, budgets and payouts.
    FinancesApprove => "finances.approve",
    FinancesExport => "finances.export",
    PaymentsView => "payments.view",
    PaymentsProcess => "payments.process",
    IssuesView => "issues.view",
    IssuesCreate => "issues.create",
    /// Route a maintenance issue to a vendor or staff member.
    IssuesAssign => "issues.assign",
    IssuesResolve => "issues.resolve",
    WorkOrdersView => "work_orders.view",
    WorkOrdersManage => "work_orders.manage",
    BidsView => "bids.view",
    BidsSubmit => "bids.submit",
    BidsApprove => "bids.approve",
    DocumentsView => "documents.view",
    DocumentsUpload => "documents.upload",
    DocumentsDelete => "documents.delete",
    BoardView => "board.view",
    BoardVote => "board.vote",
    ReportsView => "reports.view",
    ReportsGenerate => "reports.generate",
    UsersView => "users.view",
    UsersManage => "users.manage",
    SettingsManage => "settings.manage",
    EmergencyDeclare => "emergency.declare",
    EmergencyRespond => "emergency.respond",
    AuditView => "audit.view",
}

impl Permission {
    /// Domain part of the id (`"finances"` for `finances.approve`).
    pub fn category(&self) -> &'static str {
        let id = self.as_str();
        id.split_once('.').map_or(id, |(domain, _)| domain)
    }

    /// Action part of the id (`"approve"` for `finances.approve`).
    pub fn action(&self) -> &'static str {
        let id = self.as_str();
        id.split_once('.').map_or(id, |(_, action)| action)
    }

    const fn bit(self) -> u64 {
        1u64 << (self as u8)
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::from_id(s).ok_or_else(|| AuthzError::UnknownPermission(s.to_string()))
    }
}

/// Fixed-size set of permissions (one bit per [`Permission`] ordinal).
///
/// Membership tests are a single mask. Serialized as a list of permission ids.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Permission>", into = "Vec<Permission>")]
pub struct PermissionSet(u64);

impl PermissionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Set containing every permission.
    pub const fn all() -> Self {
        Self::from_slice(Permission::ALL)
    }

    pub const fn from_slice(permissions: &[Permission]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < permissions.len() {
            bits |= permissions[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(&self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    /// True if at least one of `permissions` is in the set.
    ///
    /// An empty query holds nothing, so it is `false`.
    pub fn contains_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.contains(*p))
    }

    /// True if every one of `permissions` is in the set (vacuously true when empty).
    pub fn contains_all(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.contains(*p))
    }

    pub fn insert(&mut self, permission: Permission) {
        self.0 |= permission.bit();
    }

    pub fn remove(&mut self, permission: Permission) {
        self.0 &= !permission.bit();
    }

    #[must_use]
    pub const fn union(self, other: PermissionSet) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn difference(self, other: PermissionSet) -> Self {
        Self(self.0 & !other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL.iter().copied().filter(|p| self.contains(*p))
    }
}

impl ValueObject for PermissionSet {}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::empty();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

impl From<Vec<Permission>> for PermissionSet {
    fn from(value: Vec<Permission>) -> Self {
        value.into_iter().collect()
    }
}

impl From<PermissionSet> for Vec<Permission> {
    fn from(value: PermissionSet) -> Self {
        value.iter().collect()
    }
}
