use core::str::FromStr;

use serde::{Deserialize, Serialize};

use rentwise_core::ValueObject;

use crate::AuthzError;

/// Role identifier used for RBAC.
///
/// Closed set: adding a role means touching the permission catalog and the
/// hierarchy, both of which match exhaustively on this enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    SuperAdmin,
    PropertyManager,
    BoardMember,
    Accountant,
    Owner,
    Tenant,
    Vendor,
    EmergencyAgent,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::SuperAdmin,
        Role::PropertyManager,
        Role::BoardMember,
        Role::Accountant,
        Role::Owner,
        Role::Tenant,
        Role::Vendor,
        Role::EmergencyAgent,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::PropertyManager => "property_manager",
            Role::BoardMember => "board_member",
            Role::Accountant => "accountant",
            Role::Owner => "owner",
            Role::Tenant => "tenant",
            Role::Vendor => "vendor",
            Role::EmergencyAgent => "emergency_agent",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Role::ALL.into_iter().find(|role| role.as_str() == id)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Platform administrator with every permission",
            Role::PropertyManager => "Runs day-to-day operations across managed properties",
            Role::BoardMember => "Association board member with oversight and voting rights",
            Role::Accountant => "Financial specialist with ledger, payment and audit access",
            Role::Owner => "Owner of one or more properties or units",
            Role::Tenant => "Resident renting a unit",
            Role::Vendor => "Contractor bidding on and fulfilling work orders",
            Role::EmergencyAgent => "On-call responder for emergencies and urgent issues",
        }
    }

    const fn bit(self) -> u8 {
        1u8 << (self as u8)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_id(s).ok_or_else(|| AuthzError::UnknownRole(s.to_string()))
    }
}

/// Set of roles (one bit per [`Role`]).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleSet(u8);

impl RoleSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn single(role: Role) -> Self {
        Self(role.bit())
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn remove(&mut self, role: Role) {
        self.0 &= !role.bit();
    }

    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    #[must_use]
    pub const fn union(self, other: RoleSet) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl ValueObject for RoleSet {}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = Self::empty();
        for role in iter {
            set.insert(role);
        }
        set
    }
}

impl From<Vec<Role>> for RoleSet {
    fn from(value: Vec<Role>) -> Self {
        value.into_iter().collect()
    }
}

impl From<RoleSet> for Vec<Role> {
    fn from(value: RoleSet) -> Self {
        value.iter().collect()
    }
}
