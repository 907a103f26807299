//! Privilege ordering over roles.
//!
//! The hierarchy only answers "which role is more privileged"; it is never
//! consulted for permission lookups.

use crate::{Role, RoleSet};

/// Privilege rank of a role. Higher means more privileged.
pub type Rank = u8;

/// Total order over [`Role`], lowest privilege first.
pub struct RoleHierarchy;

impl RoleHierarchy {
    /// Roles ordered from least to most privileged.
    pub const ORDER: [Role; 8] = [
        Role::Tenant,
        Role::Owner,
        Role::Vendor,
        Role::EmergencyAgent,
        Role::Accountant,
        Role::BoardMember,
        Role::PropertyManager,
        Role::SuperAdmin,
    ];

    /// Position of `role` in [`RoleHierarchy::ORDER`].
    pub const fn rank(role: Role) -> Rank {
        match role {
            Role::Tenant => 0,
            Role::Owner => 1,
            Role::Vendor => 2,
            Role::EmergencyAgent => 3,
            Role::Accountant => 4,
            Role::BoardMember => 5,
            Role::PropertyManager => 6,
            Role::SuperAdmin => 7,
        }
    }

    pub const fn has_higher_or_equal_rank(role: Role, other: Role) -> bool {
        Self::rank(role) >= Self::rank(other)
    }

    /// Most privileged role in `roles`, or `None` for an empty set.
    pub fn highest_of(roles: RoleSet) -> Option<Role> {
        roles.iter().max_by_key(|role| Self::rank(*role))
    }

    /// Resolves a role id that came from outside the typed core (claims,
    /// config). Unknown ids are logged and yield `None`; callers decide whether
    /// that is fatal.
    pub fn rank_of_named(role: &str) -> Option<Rank> {
        match Role::from_id(role) {
            Some(role) => Some(Self::rank(role)),
            None => {
                tracing::warn!(role, "role id is not part of the hierarchy");
                None
            }
        }
    }
}
