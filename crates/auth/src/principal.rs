use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use rentwise_core::{Entity, PrincipalId, PropertyId, UnitId, ValueObject};

use crate::hierarchy::RoleHierarchy;
use crate::{AuthzError, Role, RoleSet};

/// Explicit allow-list of resources a principal may touch.
///
/// Only consulted for roles without wildcard access (see `ResourceScopeGuard`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGrants {
    #[serde(default)]
    pub property_ids: BTreeSet<PropertyId>,
    #[serde(default)]
    pub unit_ids: BTreeSet<UnitId>,
}

impl ResourceGrants {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_property(mut self, property_id: PropertyId) -> Self {
        self.property_ids.insert(property_id);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, unit_id: UnitId) -> Self {
        self.unit_ids.insert(unit_id);
        self
    }

    pub fn covers_property(&self, property_id: &PropertyId) -> bool {
        self.property_ids.contains(property_id)
    }

    pub fn covers_unit(&self, unit_id: &UnitId) -> bool {
        self.unit_ids.contains(unit_id)
    }
}

impl ValueObject for ResourceGrants {}

/// An authenticated principal.
///
/// # Invariants
/// - `assigned_roles` is never empty.
/// - `active_role` is always a member of `assigned_roles`.
///
/// Values are immutable; a role switch yields a new `Principal`. This keeps a
/// snapshot safe to hand to any number of concurrent readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PrincipalRecord", into = "PrincipalRecord")]
pub struct Principal {
    id: PrincipalId,
    assigned_roles: RoleSet,
    active_role: Role,
    grants: ResourceGrants,
}

impl Principal {
    /// Build a principal, activating its most privileged role.
    pub fn new(
        id: PrincipalId,
        assigned_roles: RoleSet,
        grants: ResourceGrants,
    ) -> Result<Self, AuthzError> {
        let active_role =
            RoleHierarchy::highest_of(assigned_roles).ok_or(AuthzError::NoRolesAssigned)?;
        Ok(Self {
            id,
            assigned_roles,
            active_role,
            grants,
        })
    }

    /// Build a principal with an explicit active role.
    pub fn with_active_role(
        id: PrincipalId,
        assigned_roles: RoleSet,
        active_role: Role,
        grants: ResourceGrants,
    ) -> Result<Self, AuthzError> {
        if assigned_roles.is_empty() {
            return Err(AuthzError::NoRolesAssigned);
        }
        if !assigned_roles.contains(active_role) {
            return Err(AuthzError::ActiveRoleNotAssigned(active_role));
        }
        Ok(Self {
            id,
            assigned_roles,
            active_role,
            grants,
        })
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.id
    }

    pub fn assigned_roles(&self) -> RoleSet {
        self.assigned_roles
    }

    pub fn active_role(&self) -> Role {
        self.active_role
    }

    pub fn grants(&self) -> &ResourceGrants {
        &self.grants
    }

    pub fn holds_role(&self, role: Role) -> bool {
        self.assigned_roles.contains(role)
    }

    /// Functional role switch.
    ///
    /// Returns a new value with `role` active. Switching to the role that is
    /// already active returns an identical copy. `self` is never modified.
    pub fn switched_to(&self, role: Role) -> Result<Self, AuthzError> {
        if !self.assigned_roles.contains(role) {
            return Err(AuthzError::PermissionDenied { requested: role });
        }
        Ok(Self {
            active_role: role,
            ..self.clone()
        })
    }
}

impl Entity for Principal {
    type Id = PrincipalId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Wire shape of a principal; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrincipalRecord {
    id: PrincipalId,
    assigned_roles: RoleSet,
    active_role: Role,
    #[serde(default)]
    resource_grants: ResourceGrants,
}

impl TryFrom<PrincipalRecord> for Principal {
    type Error = AuthzError;

    fn try_from(record: PrincipalRecord) -> Result<Self, Self::Error> {
        Principal::with_active_role(
            record.id,
            record.assigned_roles,
            record.active_role,
            record.resource_grants,
        )
    }
}

impl From<Principal> for PrincipalRecord {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            assigned_roles: principal.assigned_roles,
            active_role: principal.active_role,
            resource_grants: principal.grants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(list: &[Role]) -> RoleSet {
        list.iter().copied().collect()
    }

    #[test]
    fn new_activates_the_highest_role() {
        let principal = Principal::new(
            PrincipalId::new(),
            roles(&[Role::Tenant, Role::Accountant]),
            ResourceGrants::new(),
        )
        .unwrap();
        assert_eq!(principal.active_role(), Role::Accountant);
    }

    #[test]
    fn new_without_roles_fails() {
        let err = Principal::new(PrincipalId::new(), RoleSet::empty(), ResourceGrants::new())
            .unwrap_err();
        assert_eq!(err, AuthzError::NoRolesAssigned);
    }

    #[test]
    fn explicit_active_role_must_be_assigned() {
        let err = Principal::with_active_role(
            PrincipalId::new(),
            roles(&[Role::Owner]),
            Role::SuperAdmin,
            ResourceGrants::new(),
        )
        .unwrap_err();
        assert_eq!(err, AuthzError::ActiveRoleNotAssigned(Role::SuperAdmin));
    }

    #[test]
    fn switch_produces_a_new_value() {
        let original = Principal::new(
            PrincipalId::new(),
            roles(&[Role::Owner, Role::BoardMember]),
            ResourceGrants::new(),
        )
        .unwrap();

        let switched = original.switched_to(Role::Owner).unwrap();
        assert_eq!(original.active_role(), Role::BoardMember);
        assert_eq!(switched.active_role(), Role::Owner);
        assert!(switched.same_entity(&original));
    }

    #[test]
    fn switch_to_unassigned_role_is_denied() {
        let original =
            Principal::new(PrincipalId::new(), roles(&[Role::Tenant]), ResourceGrants::new())
                .unwrap();
        let err = original.switched_to(Role::BoardMember).unwrap_err();
        assert_eq!(err, AuthzError::PermissionDenied { requested: Role::BoardMember });
    }

    #[test]
    fn deserialization_enforces_invariants() {
        let id = PrincipalId::new();
        let good = format!(
            r#"{{"id":"{id}","assignedRoles":["owner"],"activeRole":"owner",
                "resourceGrants":{{"propertyIds":["p1"]}}}}"#
        );
        let principal: Principal = serde_json::from_str(&good).unwrap();
        assert!(principal.grants().covers_property(&PropertyId::new("p1").unwrap()));

        let bad = format!(r#"{{"id":"{id}","assignedRoles":["owner"],"activeRole":"super_admin"}}"#);
        assert!(serde_json::from_str::<Principal>(&bad).is_err());

        let empty = format!(r#"{{"id":"{id}","assignedRoles":[],"activeRole":"owner"}}"#);
        assert!(serde_json::from_str::<Principal>(&empty).is_err());
    }

    #[test]
    fn serialization_round_trips() {
        let principal = Principal::new(
            PrincipalId::new(),
            roles(&[Role::Vendor]),
            ResourceGrants::new().with_unit(UnitId::new("u1").unwrap()),
        )
        .unwrap();
        let json = serde_json::to_string(&principal).unwrap();
        let back: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, principal);
    }
}
