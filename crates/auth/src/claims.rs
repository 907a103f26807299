use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rentwise_core::{PrincipalId, PropertyId, UnitId};

use crate::{AuthorizationContext, AuthzError, Principal, ResourceGrants, Role, RoleSet};

/// Session claims model (transport-agnostic).
///
/// This is the set of claims the authorization core expects once a token has
/// been decoded/verified by whatever authentication layer is in use. Roles
/// stay raw strings here so unknown ids can be reported instead of silently
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject / principal identifier.
    pub sub: PrincipalId,

    /// Role ids granted to the subject.
    pub roles: Vec<String>,

    #[serde(default)]
    pub property_ids: Vec<PropertyId>,

    #[serde(default)]
    pub unit_ids: Vec<UnitId>,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignInError {
    #[error(transparent)]
    Token(#[from] TokenValidationError),

    #[error(transparent)]
    Authz(#[from] AuthzError),
}

/// Deterministically validate the claim time window.
///
/// Note: this validates the *claims* only. Signature verification / decoding is
/// intentionally outside this crate.
pub fn validate_claims(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

impl SessionClaims {
    /// Parse the role ids. Any unknown id rejects the whole set.
    pub fn role_set(&self) -> Result<RoleSet, AuthzError> {
        self.roles
            .iter()
            .map(|raw| {
                raw.parse::<Role>().inspect_err(|_| {
                    tracing::warn!(principal_id = %self.sub, role = %raw, "claims carry an unknown role");
                })
            })
            .collect()
    }

    pub fn grants(&self) -> ResourceGrants {
        ResourceGrants {
            property_ids: self.property_ids.iter().cloned().collect(),
            unit_ids: self.unit_ids.iter().cloned().collect(),
        }
    }

    pub fn to_principal(&self) -> Result<Principal, AuthzError> {
        Principal::new(self.sub, self.role_set()?, self.grants())
    }
}

/// Turn verified claims into a session, elevated to the highest assigned role.
pub fn sign_in(claims: &SessionClaims, now: DateTime<Utc>) -> Result<AuthorizationContext, SignInError> {
    validate_claims(claims, now)?;
    let principal = claims.to_principal()?;
    Ok(AuthorizationContext::sign_in(principal))
}
