//! `rentwise-auth` — role-based authorization core (fail-closed).
//!
//! Pure decisions over static catalogs: roles, permissions, resource scopes,
//! route guards and navigation pruning. No HTTP, no storage, no token
//! verification; those belong to the callers.

pub mod authorize;
pub mod catalog;
pub mod claims;
pub mod config;
pub mod context;
pub mod hierarchy;
pub mod navigation;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod routes;
pub mod scope;

pub use authorize::{AuthorizationExplanation, AuthzError, explain_authorization};
pub use catalog::{PermissionCatalog, RbacRegistry};
pub use claims::{SessionClaims, SignInError, TokenValidationError, sign_in, validate_claims};
pub use config::{AuthzConfig, ConfigError};
pub use context::AuthorizationContext;
pub use hierarchy::RoleHierarchy;
pub use navigation::{NavigationFilter, NavigationNode};
pub use permissions::{Permission, PermissionSet};
pub use principal::{Principal, ResourceGrants};
pub use roles::{Role, RoleSet};
pub use routes::{RouteDecision, RoutePattern, RoutePermissionRule, RouteTable};
pub use scope::{GrantSource, ResourceScopeGuard, StaticGrantSource};
