use serde::Serialize;
use thiserror::Error;

use rentwise_core::PrincipalId;

use crate::catalog::PermissionCatalog;
use crate::{Permission, PermissionSet, Principal, Role, RoleSet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// A role switch targeted a role the principal does not hold.
    #[error("permission denied: role '{requested}' is not assigned to this principal")]
    PermissionDenied { requested: Role },

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(Permission),

    #[error("principal has no roles assigned")]
    NoRolesAssigned,

    #[error("active role '{0}' is not among the assigned roles")]
    ActiveRoleNotAssigned(Role),

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("unknown permission '{0}'")]
    UnknownPermission(String),

    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidRoutePattern { pattern: String, reason: &'static str },

    #[error("invalid redirect '{0}': must be a local absolute path")]
    InvalidRedirect(String),

    #[error("route table could not be loaded: {0}")]
    RouteTable(String),

    #[error("resource grant lookup timed out")]
    GrantLookupTimedOut,

    #[error("resource grant lookup failed: {0}")]
    GrantLookup(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// This structure provides transparent, debuggable information about why
/// a request was allowed or denied.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    /// The permission that was being checked.
    pub required_permission: Permission,

    /// Whether the authorization was granted.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Details about the principal's state.
    pub principal: PrincipalState,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

/// Current state of the principal being checked.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub principal_id: PrincipalId,
    pub active_role: Role,
    pub assigned_roles: RoleSet,
    pub effective_permissions: PermissionSet,
}

/// Detailed reason why authorization was denied.
#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// Another assigned role grants the permission; switching would help.
    InactiveRole,
    /// None of the assigned roles grants the permission.
    MissingPermission,
}

/// Explain why a permission check on `principal` succeeds or fails.
///
/// Only the active role counts towards the decision. On denial the
/// explanation lists the principal's other roles that would grant the
/// permission, since a role switch is the usual fix.
pub fn explain_authorization(
    principal: &Principal,
    required: Permission,
) -> AuthorizationExplanation {
    let active_role = principal.active_role();
    let effective_permissions = PermissionCatalog::permissions_for(active_role);
    let state = PrincipalState {
        principal_id: principal.principal_id(),
        active_role,
        assigned_roles: principal.assigned_roles(),
        effective_permissions,
    };

    if effective_permissions.contains(required) {
        return AuthorizationExplanation {
            required_permission: required,
            granted: true,
            reason: format!("Active role '{active_role}' grants permission '{required}'"),
            principal: state,
            denial_reason: None,
        };
    }

    let granting_roles: Vec<Role> = principal
        .assigned_roles()
        .iter()
        .filter(|role| PermissionCatalog::has_permission(*role, required))
        .collect();

    let denial_reason = if granting_roles.is_empty() {
        DenialReason {
            kind: DenialKind::MissingPermission,
            message: format!("Missing required permission: '{required}'"),
            suggestions: vec![format!(
                "Assign one of the roles that grant '{required}': {}",
                role_list(PermissionCatalog::roles_granting(required).iter())
            )],
        }
    } else {
        DenialReason {
            kind: DenialKind::InactiveRole,
            message: format!(
                "Permission '{required}' is granted by an assigned role that is not active"
            ),
            suggestions: granting_roles
                .iter()
                .map(|role| format!("Switch the active role to '{role}'"))
                .collect(),
        }
    };

    AuthorizationExplanation {
        required_permission: required,
        granted: false,
        reason: format!(
            "Active role '{active_role}' does not grant permission '{required}'. Current permissions: {}",
            effective_permissions
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        principal: state,
        denial_reason: Some(denial_reason),
    }
}

fn role_list(roles: impl Iterator<Item = Role>) -> String {
    roles.map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
}
