//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an authenticated principal (human user, service account, etc).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(Uuid);

impl PrincipalId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
    /// for determinism.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<PrincipalId> for Uuid {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl FromStr for PrincipalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("PrincipalId: {e}")))?;
        Ok(Self(uuid))
    }
}

/// Identifier of a managed property (building, complex).
///
/// Property identifiers are opaque strings owned by the listing/management
/// side of the platform. They must be non-empty and free of whitespace and `/`
/// so they can be embedded in route paths verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyId(String);

/// Identifier of a rentable unit inside a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitId(String);

fn validate_resource_id(name: &str, raw: &str) -> Result<(), DomainError> {
    if raw.is_empty() {
        return Err(DomainError::invalid_id(format!("{name}: must not be empty")));
    }
    if raw.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(DomainError::invalid_id(format!(
            "{name}: '{raw}' contains whitespace or '/'"
        )));
    }
    Ok(())
}

macro_rules! impl_string_id {
    ($t:ident, $name:literal) => {
        impl $t {
            pub fn new(raw: impl Into<String>) -> Result<Self, DomainError> {
                let raw = raw.into();
                validate_resource_id($name, &raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_string_id!(PropertyId, "PropertyId");
impl_string_id!(UnitId, "UnitId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_id_rejects_empty_and_slashes() {
        assert!(PropertyId::new("").is_err());
        assert!(PropertyId::new("p/1").is_err());
        assert!(PropertyId::new("p 1").is_err());
        assert_eq!(PropertyId::new("p1").unwrap().as_str(), "p1");
    }

    #[test]
    fn unit_id_deserialization_is_validated() {
        let ok: UnitId = serde_json::from_str("\"u-7\"").unwrap();
        assert_eq!(ok.to_string(), "u-7");

        let err = serde_json::from_str::<UnitId>("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn principal_id_parse_reports_invalid_id() {
        let err = "not-a-uuid".parse::<PrincipalId>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidId(msg) if msg.starts_with("PrincipalId")));
    }
}
