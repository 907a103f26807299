//! Session-scoped authorization context.
//!
//! A context wraps one immutable [`Principal`] snapshot. Nothing here is
//! shared mutable state: a role switch returns a new context and leaves the
//! old one untouched, so a request can keep evaluating against the snapshot
//! it started with.

use rentwise_core::{PropertyId, UnitId};

use crate::authorize::{AuthorizationExplanation, explain_authorization};
use crate::catalog::PermissionCatalog;
use crate::navigation::{NavigationFilter, NavigationNode};
use crate::routes::{RouteDecision, RouteTable};
use crate::scope::ResourceScopeGuard;
use crate::{AuthzError, Permission, PermissionSet, Principal, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    principal: Principal,
    permissions: PermissionSet,
}

impl AuthorizationContext {
    /// Bind a freshly authenticated principal.
    pub fn sign_in(principal: Principal) -> Self {
        tracing::info!(
            principal_id = %principal.principal_id(),
            active_role = %principal.active_role(),
            assigned_roles = principal.assigned_roles().len(),
            "principal signed in"
        );
        Self::new(principal)
    }

    fn new(principal: Principal) -> Self {
        let permissions = PermissionCatalog::permissions_for(principal.active_role());
        Self {
            principal,
            permissions,
        }
    }

    /// End the session. Dropping the context is all there is to it.
    pub fn sign_out(self) {
        tracing::info!(principal_id = %self.principal.principal_id(), "principal signed out");
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn active_role(&self) -> Role {
        self.principal.active_role()
    }

    /// Permissions of the active role.
    pub fn permissions(&self) -> PermissionSet {
        self.permissions
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    pub fn can_any(&self, permissions: &[Permission]) -> bool {
        self.permissions.contains_any(permissions)
    }

    pub fn can_all(&self, permissions: &[Permission]) -> bool {
        self.permissions.contains_all(permissions)
    }

    pub fn is_role(&self, role: Role) -> bool {
        self.principal.active_role() == role
    }

    /// Command-style check: `Ok(())` or `Forbidden`.
    pub fn require(&self, permission: Permission) -> Result<(), AuthzError> {
        if self.can(permission) {
            Ok(())
        } else {
            tracing::debug!(
                principal_id = %self.principal.principal_id(),
                active_role = %self.active_role(),
                %permission,
                "permission check failed"
            );
            Err(AuthzError::Forbidden(permission))
        }
    }

    pub fn explain(&self, permission: Permission) -> AuthorizationExplanation {
        explain_authorization(&self.principal, permission)
    }

    /// Switch the active role.
    ///
    /// Succeeds only for an assigned role and yields a new context; `self`
    /// stays valid and unchanged either way. Switching to the active role is a
    /// no-op that returns an equal context.
    pub fn switch_role(&self, role: Role) -> Result<Self, AuthzError> {
        if self.is_role(role) {
            return Ok(self.clone());
        }

        match self.principal.switched_to(role) {
            Ok(principal) => {
                tracing::info!(
                    principal_id = %principal.principal_id(),
                    from = %self.active_role(),
                    to = %role,
                    "active role switched"
                );
                Ok(Self::new(principal))
            }
            Err(err) => {
                tracing::warn!(
                    principal_id = %self.principal.principal_id(),
                    requested = %role,
                    "role switch denied"
                );
                Err(err)
            }
        }
    }

    pub fn has_access_to_property(&self, property_id: &PropertyId) -> bool {
        ResourceScopeGuard::has_access_to_property(&self.principal, property_id)
    }

    pub fn has_access_to_unit(&self, unit_id: &UnitId) -> bool {
        ResourceScopeGuard::has_access_to_unit(&self.principal, unit_id)
    }

    /// Guard a route path with the permissions of the active role.
    pub fn resolve_route(&self, routes: &RouteTable, path: &str) -> RouteDecision {
        routes.resolve(path, self.permissions)
    }

    /// Navigation tree pruned to what the active role may see.
    pub fn filter_navigation(&self, tree: &[NavigationNode]) -> Vec<NavigationNode> {
        NavigationFilter::filter(tree, self.permissions)
    }
}
