//! Route guarding: path pattern → required permissions.
//!
//! Rules are evaluated in order and the first matching pattern wins, so the
//! table must list specific patterns before general ones. Unmapped paths are
//! allowed. Anything malformed (a bad pattern in the table, a path that is
//! not absolute) denies.

use serde::{Deserialize, Serialize};

use crate::permissions::Permission as P;
use crate::{AuthzError, Permission, PermissionSet};

/// Redirect used when a denying rule does not name its own.
pub const DEFAULT_REDIRECT: &str = "/dashboard";

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutePermissionRule {
    pub path_pattern: String,
    #[serde(default)]
    pub required_permissions: Vec<Permission>,
    #[serde(default)]
    pub require_all: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl RoutePermissionRule {
    pub fn new(path_pattern: impl Into<String>, required_permissions: &[Permission]) -> Self {
        Self {
            path_pattern: path_pattern.into(),
            required_permissions: required_permissions.to_vec(),
            require_all: false,
            redirect: None,
        }
    }

    /// Rule with no requirements: always allowed once matched.
    pub fn public(path_pattern: impl Into<String>) -> Self {
        Self::new(path_pattern, &[])
    }

    #[must_use]
    pub fn requiring_all(mut self) -> Self {
        self.require_all = true;
        self
    }

    #[must_use]
    pub fn redirect_to(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    fn evaluate(&self, permissions: PermissionSet, default_redirect: &str) -> RouteDecision {
        if self.required_permissions.is_empty() {
            return RouteDecision::allow();
        }
        let allowed = if self.require_all {
            permissions.contains_all(&self.required_permissions)
        } else {
            permissions.contains_any(&self.required_permissions)
        };
        if allowed {
            RouteDecision::allow()
        } else {
            let redirect = self
                .redirect
                .as_deref()
                .filter(|redirect| is_local_redirect(redirect))
                .unwrap_or(default_redirect);
            RouteDecision::deny(redirect)
        }
    }
}

/// A redirect target must be a path on this site: absolute, and not
/// protocol-relative (`//host/...`).
pub fn is_local_redirect(redirect: &str) -> bool {
    redirect.starts_with('/') && !redirect.starts_with("//")
}

/// Outcome of guarding a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl RouteDecision {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            redirect: None,
        }
    }

    pub fn deny(redirect: impl Into<String>) -> Self {
        Self {
            allowed: false,
            redirect: Some(redirect.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `prefix:name` matches one segment that starts with `prefix` and has at
    /// least one more character. The name runs to the next `/`.
    Param { prefix: String, name: String },
}

/// A compiled path pattern such as `/properties/:id/units/:unitId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Result<Self, AuthzError> {
        let invalid = |reason| AuthzError::InvalidRoutePattern {
            pattern: pattern.to_string(),
            reason,
        };

        let rest = pattern.strip_prefix('/').ok_or_else(|| invalid("must start with '/'"))?;
        if pattern.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
            return Err(invalid("must not contain whitespace, '?' or '#'"));
        }

        let segments = rest
            .split('/')
            .map(|segment| match segment.split_once(':') {
                Some((_, "")) => Err(invalid("parameter without a name")),
                Some((prefix, name)) => Ok(Segment::Param {
                    prefix: prefix.to_string(),
                    name: name.to_string(),
                }),
                None => Ok(Segment::Literal(segment.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// Names of the `:name` parameters, in order.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    fn matches(&self, path_segments: &[&str]) -> bool {
        self.segments.len() == path_segments.len()
            && self
                .segments
                .iter()
                .zip(path_segments)
                .all(|(pattern, actual)| match pattern {
                    Segment::Literal(literal) => literal == actual,
                    Segment::Param { prefix, .. } => {
                        actual.len() > prefix.len() && actual.starts_with(prefix.as_str())
                    }
                })
    }

    /// Whole-path match (query string and fragment ignored).
    pub fn matches_path(&self, path: &str) -> bool {
        split_path(path).is_some_and(|segments| self.matches(&segments))
    }
}

/// Splits an absolute path into segments, dropping any query or fragment.
fn split_path(path: &str) -> Option<Vec<&str>> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let rest = path[..end].strip_prefix('/')?;
    Some(rest.split('/').collect())
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: RoutePermissionRule,
    pattern: Result<RoutePattern, AuthzError>,
}

/// Serialized form of a route table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RouteTableConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_redirect: Option<String>,
    pub rules: Vec<RoutePermissionRule>,
}

impl RouteTableConfig {
    /// Parse either a bare list of rules or
    /// `{"defaultRedirect": "...", "rules": [...]}`.
    pub fn from_json(json: &str) -> Result<Self, AuthzError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Document {
            Rules(Vec<RoutePermissionRule>),
            Table(RouteTableConfig),
        }

        match serde_json::from_str::<Document>(json) {
            Ok(Document::Rules(rules)) => Ok(Self {
                default_redirect: None,
                rules,
            }),
            Ok(Document::Table(config)) => Ok(config),
            Err(err) => Err(AuthzError::RouteTable(err.to_string())),
        }
    }
}

/// Ordered, immutable route rule table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<CompiledRule>,
    default_redirect: String,
}

impl RouteTable {
    /// Compile `rules`. Malformed patterns are kept (and logged): resolution
    /// denies as soon as it reaches one.
    pub fn new(rules: Vec<RoutePermissionRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let pattern = RoutePattern::parse(&rule.path_pattern);
                if let Err(err) = &pattern {
                    tracing::warn!(error = %err, "malformed route pattern; paths reaching it are denied");
                }
                if let Some(redirect) = rule.redirect.as_deref().filter(|r| !is_local_redirect(r)) {
                    tracing::warn!(
                        pattern = %rule.path_pattern,
                        redirect,
                        "route redirect is not a local path; the default redirect is used instead"
                    );
                }
                CompiledRule { rule, pattern }
            })
            .collect();
        Self {
            rules,
            default_redirect: DEFAULT_REDIRECT.to_string(),
        }
    }

    /// Compile `rules`, rejecting the table if any pattern or redirect is
    /// malformed.
    pub fn try_new(rules: Vec<RoutePermissionRule>) -> Result<Self, AuthzError> {
        for rule in &rules {
            RoutePattern::parse(&rule.path_pattern)?;
            if let Some(redirect) = rule.redirect.as_deref().filter(|r| !is_local_redirect(r)) {
                return Err(AuthzError::InvalidRedirect(redirect.to_string()));
            }
        }
        Ok(Self::new(rules))
    }

    #[must_use]
    pub fn with_default_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.default_redirect = redirect.into();
        self
    }

    /// Load a table from JSON (see [`RouteTableConfig::from_json`]).
    ///
    /// Unknown permission ids and malformed patterns reject the whole table.
    pub fn from_json(json: &str) -> Result<Self, AuthzError> {
        Self::from_config(RouteTableConfig::from_json(json)?)
    }

    pub fn from_config(config: RouteTableConfig) -> Result<Self, AuthzError> {
        if let Some(redirect) = config.default_redirect.as_deref().filter(|r| !is_local_redirect(r)) {
            return Err(AuthzError::InvalidRedirect(redirect.to_string()));
        }
        let table = Self::try_new(config.rules)?;
        Ok(match config.default_redirect {
            Some(redirect) => table.with_default_redirect(redirect),
            None => table,
        })
    }

    pub fn to_config(&self) -> RouteTableConfig {
        RouteTableConfig {
            default_redirect: Some(self.default_redirect.clone()),
            rules: self.rules().cloned().collect(),
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &RoutePermissionRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    pub fn default_redirect(&self) -> &str {
        &self.default_redirect
    }

    /// Guard `path` for a caller holding `permissions`.
    pub fn resolve(&self, path: &str, permissions: PermissionSet) -> RouteDecision {
        let Some(segments) = split_path(path) else {
            tracing::warn!(path, "route path is not absolute; denying");
            return RouteDecision::deny(self.default_redirect.as_str());
        };

        for compiled in &self.rules {
            match &compiled.pattern {
                Err(err) => {
                    tracing::warn!(path, error = %err, "reached malformed route rule; denying");
                    return RouteDecision::deny(self.default_redirect.as_str());
                }
                Ok(pattern) if pattern.matches(&segments) => {
                    let decision = compiled.rule.evaluate(permissions, &self.default_redirect);
                    tracing::debug!(
                        path,
                        pattern = %compiled.rule.path_pattern,
                        allowed = decision.allowed,
                        "route resolved"
                    );
                    return decision;
                }
                Ok(_) => {}
            }
        }

        tracing::debug!(path, "no route rule matched; allowing");
        RouteDecision::allow()
    }

    /// Route rules of the rental marketplace client, most specific first.
    pub fn builtin() -> Self {
        Self::new(vec![
            RoutePermissionRule::public("/"),
            RoutePermissionRule::public("/dashboard"),
            RoutePermissionRule::public("/profile"),
            RoutePermissionRule::new("/properties/new", &[P::PropertiesCreate]),
            RoutePermissionRule::new("/properties/:propertyId/edit", &[P::PropertiesEdit]),
            RoutePermissionRule::new("/properties/:propertyId/units/new", &[P::UnitsManage]),
            RoutePermissionRule::new("/properties/:propertyId/units/:unitId", &[P::UnitsView]),
            RoutePermissionRule::new("/properties/:propertyId/units", &[P::UnitsView]),
            RoutePermissionRule::new("/properties/:propertyId", &[P::PropertiesView]),
            RoutePermissionRule::new("/properties", &[P::PropertiesView]),
            RoutePermissionRule::new("/units/:unitId", &[P::UnitsView]),
            RoutePermissionRule::new("/tenants/:tenantId", &[P::TenantsView]),
            RoutePermissionRule::new("/tenants", &[P::TenantsView]),
            RoutePermissionRule::new("/leases/new", &[P::LeasesCreate]),
            RoutePermissionRule::new("/leases/:leaseId/approve", &[P::LeasesApprove]),
            RoutePermissionRule::new("/leases/:leaseId", &[P::LeasesView]),
            RoutePermissionRule::new("/leases", &[P::LeasesView]),
            RoutePermissionRule::new("/finances/approvals", &[P::FinancesApprove]),
            RoutePermissionRule::new("/finances/export", &[P::FinancesView, P::FinancesExport])
                .requiring_all()
                .redirect_to("/finances"),
            RoutePermissionRule::new("/finances/new", &[P::FinancesCreate]).redirect_to("/finances"),
            RoutePermissionRule::new("/finances", &[P::FinancesView]),
            RoutePermissionRule::new("/payments", &[P::PaymentsView]),
            RoutePermissionRule::new("/issues/new", &[P::IssuesCreate]).redirect_to("/issues"),
            RoutePermissionRule::new("/issues/:issueId/assign", &[P::IssuesAssign])
                .redirect_to("/issues"),
            RoutePermissionRule::new("/issues/:issueId", &[P::IssuesView]),
            RoutePermissionRule::new("/issues", &[P::IssuesView]),
            RoutePermissionRule::new("/work-orders/:workOrderId", &[P::WorkOrdersView]),
            RoutePermissionRule::new("/work-orders", &[P::WorkOrdersView]),
            RoutePermissionRule::new("/bids/new", &[P::BidsSubmit]).redirect_to("/bids"),
            RoutePermissionRule::new("/bids/:bidId", &[P::BidsView]),
            RoutePermissionRule::new("/bids", &[P::BidsView]),
            RoutePermissionRule::new("/documents", &[P::DocumentsView]),
            RoutePermissionRule::new("/board/votes", &[P::BoardVote]).redirect_to("/board"),
            RoutePermissionRule::new("/board", &[P::BoardView]),
            RoutePermissionRule::new("/reports/generate", &[P::ReportsGenerate])
                .redirect_to("/reports"),
            RoutePermissionRule::new("/reports", &[P::ReportsView]),
            RoutePermissionRule::new("/emergency", &[P::EmergencyRespond, P::EmergencyDeclare]),
            RoutePermissionRule::new("/users/:userId", &[P::UsersManage]).redirect_to("/users"),
            RoutePermissionRule::new("/users", &[P::UsersView, P::UsersManage]),
            RoutePermissionRule::new("/settings", &[P::SettingsManage]),
            RoutePermissionRule::new("/audit", &[P::AuditView]),
        ])
    }
}
