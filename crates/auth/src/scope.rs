//! Resource-scoped access checks (properties and units).
//!
//! Wildcard roles see every resource; everyone else needs an explicit grant.
//! The property and unit wildcards differ on purpose: accountants and
//! emergency agents see all properties but only granted units.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;

use rentwise_core::{PrincipalId, PropertyId, UnitId};

use crate::{AuthzError, Principal, Role};

/// Roles with access to every property.
pub const PROPERTY_WILDCARD_ROLES: [Role; 4] = [
    Role::SuperAdmin,
    Role::PropertyManager,
    Role::Accountant,
    Role::EmergencyAgent,
];

/// Roles with access to every unit.
pub const UNIT_WILDCARD_ROLES: [Role; 2] = [Role::SuperAdmin, Role::PropertyManager];

pub struct ResourceScopeGuard;

impl ResourceScopeGuard {
    pub fn has_property_wildcard(role: Role) -> bool {
        PROPERTY_WILDCARD_ROLES.contains(&role)
    }

    pub fn has_unit_wildcard(role: Role) -> bool {
        UNIT_WILDCARD_ROLES.contains(&role)
    }

    /// Access check against the grants carried by the principal.
    pub fn has_access_to_property(principal: &Principal, property_id: &PropertyId) -> bool {
        Self::has_property_wildcard(principal.active_role())
            || principal.grants().covers_property(property_id)
    }

    pub fn has_access_to_unit(principal: &Principal, unit_id: &UnitId) -> bool {
        Self::has_unit_wildcard(principal.active_role()) || principal.grants().covers_unit(unit_id)
    }

    /// Access check against grants held in an external store.
    ///
    /// The lookup is bounded by `timeout`. A timeout or a store error denies.
    pub async fn check_property_remote(
        principal: &Principal,
        property_id: &PropertyId,
        source: &dyn GrantSource,
        timeout: Duration,
    ) -> bool {
        if Self::has_property_wildcard(principal.active_role()) {
            return true;
        }
        let lookup = source.property_ids(principal.principal_id());
        match bounded(lookup, timeout).await {
            Ok(granted) => granted.contains(property_id),
            Err(err) => {
                tracing::warn!(
                    principal_id = %principal.principal_id(),
                    %property_id,
                    error = %err,
                    "property grant lookup failed; denying"
                );
                false
            }
        }
    }

    pub async fn check_unit_remote(
        principal: &Principal,
        unit_id: &UnitId,
        source: &dyn GrantSource,
        timeout: Duration,
    ) -> bool {
        if Self::has_unit_wildcard(principal.active_role()) {
            return true;
        }
        let lookup = source.unit_ids(principal.principal_id());
        match bounded(lookup, timeout).await {
            Ok(granted) => granted.contains(unit_id),
            Err(err) => {
                tracing::warn!(
                    principal_id = %principal.principal_id(),
                    %unit_id,
                    error = %err,
                    "unit grant lookup failed; denying"
                );
                false
            }
        }
    }
}

async fn bounded<T>(
    lookup: impl core::future::Future<Output = Result<T, AuthzError>>,
    timeout: Duration,
) -> Result<T, AuthzError> {
    tokio::time::timeout(timeout, lookup)
        .await
        .map_err(|_| AuthzError::GrantLookupTimedOut)?
}

/// External source of resource grants (database, directory service, ...).
#[async_trait]
pub trait GrantSource: Send + Sync {
    async fn property_ids(&self, principal_id: PrincipalId) -> Result<BTreeSet<PropertyId>, AuthzError>;

    async fn unit_ids(&self, principal_id: PrincipalId) -> Result<BTreeSet<UnitId>, AuthzError>;
}

/// In-memory grant source.
#[derive(Debug, Clone, Default)]
pub struct StaticGrantSource {
    properties: HashMap<PrincipalId, BTreeSet<PropertyId>>,
    units: HashMap<PrincipalId, BTreeSet<UnitId>>,
}

impl StaticGrantSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant_property(&mut self, principal_id: PrincipalId, property_id: PropertyId) {
        self.properties.entry(principal_id).or_default().insert(property_id);
    }

    pub fn grant_unit(&mut self, principal_id: PrincipalId, unit_id: UnitId) {
        self.units.entry(principal_id).or_default().insert(unit_id);
    }
}

#[async_trait]
impl GrantSource for StaticGrantSource {
    async fn property_ids(&self, principal_id: PrincipalId) -> Result<BTreeSet<PropertyId>, AuthzError> {
        Ok(self.properties.get(&principal_id).cloned().unwrap_or_default())
    }

    async fn unit_ids(&self, principal_id: PrincipalId) -> Result<BTreeSet<UnitId>, AuthzError> {
        Ok(self.units.get(&principal_id).cloned().unwrap_or_default())
    }
}
