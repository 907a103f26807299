//! Runtime configuration, read from the environment.
//!
//! - `RENTWISE_DEFAULT_REDIRECT`: redirect for denied routes without their own (default `/dashboard`)
//! - `RENTWISE_GRANT_LOOKUP_TIMEOUT_MS`: bound on external grant lookups (default 2000)
//! - `RENTWISE_ROUTE_RULES`: optional path to a JSON route table; the built-in table is used when unset

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::AuthzError;
use crate::routes::{DEFAULT_REDIRECT, RouteTable, RouteTableConfig, is_local_redirect};

pub const ENV_DEFAULT_REDIRECT: &str = "RENTWISE_DEFAULT_REDIRECT";
pub const ENV_GRANT_LOOKUP_TIMEOUT_MS: &str = "RENTWISE_GRANT_LOOKUP_TIMEOUT_MS";
pub const ENV_ROUTE_RULES: &str = "RENTWISE_ROUTE_RULES";

const DEFAULT_GRANT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidTimeout { key: &'static str, value: String },

    #[error("{key} must be a local absolute path, got '{value}'")]
    InvalidRedirect { key: &'static str, value: String },

    #[error("failed to read route rules from {}: {source}", path.display())]
    ReadRoutes {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route rules in {}: {source}", path.display())]
    InvalidRoutes {
        path: PathBuf,
        #[source]
        source: AuthzError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzConfig {
    pub default_redirect: String,
    pub grant_lookup_timeout: Duration,
    pub route_rules_path: Option<PathBuf>,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            default_redirect: DEFAULT_REDIRECT.to_string(),
            grant_lookup_timeout: DEFAULT_GRANT_LOOKUP_TIMEOUT,
            route_rules_path: None,
        }
    }
}

impl AuthzConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DEFAULT_REDIRECT) {
            if !is_local_redirect(&value) {
                return Err(ConfigError::InvalidRedirect {
                    key: ENV_DEFAULT_REDIRECT,
                    value,
                });
            }
            config.default_redirect = value;
        }

        if let Some(value) = lookup(ENV_GRANT_LOOKUP_TIMEOUT_MS) {
            let millis = value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    key: ENV_GRANT_LOOKUP_TIMEOUT_MS,
                    value: value.clone(),
                })?;
            config.grant_lookup_timeout = Duration::from_millis(millis);
        }

        config.route_rules_path = lookup(ENV_ROUTE_RULES)
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }

    /// Route table named by the configuration, or the built-in one.
    ///
    /// The configured default redirect applies unless the file sets its own.
    pub fn load_route_table(&self) -> Result<RouteTable, ConfigError> {
        let Some(path) = &self.route_rules_path else {
            return Ok(RouteTable::builtin().with_default_redirect(self.default_redirect.as_str()));
        };

        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadRoutes {
            path: path.clone(),
            source,
        })?;
        let mut config =
            RouteTableConfig::from_json(&json).map_err(|source| ConfigError::InvalidRoutes {
                path: path.clone(),
                source,
            })?;
        if config.default_redirect.is_none() {
            config.default_redirect = Some(self.default_redirect.clone());
        }

        let table = RouteTable::from_config(config).map_err(|source| ConfigError::InvalidRoutes {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), rules = table.rules().count(), "loaded route rules");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AuthzConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AuthzConfig::default());
        assert_eq!(config.default_redirect, "/dashboard");
    }

    #[test]
    fn values_are_read() {
        let config = AuthzConfig::from_lookup(lookup(&[
            (ENV_DEFAULT_REDIRECT, "/home"),
            (ENV_GRANT_LOOKUP_TIMEOUT_MS, "250"),
            (ENV_ROUTE_RULES, "/etc/rentwise/routes.json"),
        ]))
        .unwrap();

        assert_eq!(config.default_redirect, "/home");
        assert_eq!(config.grant_lookup_timeout, Duration::from_millis(250));
        assert_eq!(config.route_rules_path, Some(PathBuf::from("/etc/rentwise/routes.json")));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            AuthzConfig::from_lookup(lookup(&[(ENV_GRANT_LOOKUP_TIMEOUT_MS, "soon")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        assert!(matches!(
            AuthzConfig::from_lookup(lookup(&[(ENV_GRANT_LOOKUP_TIMEOUT_MS, "0")])),
            Err(ConfigError::InvalidTimeout { .. })
        ));
        for redirect in ["home", "//elsewhere.example/home"] {
            assert!(matches!(
                AuthzConfig::from_lookup(lookup(&[(ENV_DEFAULT_REDIRECT, redirect)])),
                Err(ConfigError::InvalidRedirect { .. })
            ));
        }
    }

    #[test]
    fn builtin_table_uses_configured_redirect() {
        let config = AuthzConfig {
            default_redirect: "/home".to_string(),
            ..AuthzConfig::default()
        };
        let table = config.load_route_table().unwrap();
        assert_eq!(table.default_redirect(), "/home");
    }

    #[test]
    fn route_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "pathPattern": "/audit", "requiredPermissions": ["audit.view"] }}]"#
        )
        .unwrap();

        let config = AuthzConfig {
            default_redirect: "/home".to_string(),
            route_rules_path: Some(file.path().to_path_buf()),
            ..AuthzConfig::default()
        };
        let table = config.load_route_table().unwrap();

        assert_eq!(table.rules().count(), 1);
        assert_eq!(table.default_redirect(), "/home");
    }

    #[test]
    fn route_file_with_unknown_permission_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{ "pathPattern": "/audit", "requiredPermissions": ["audit.erase"] }}]"#).unwrap();

        let config = AuthzConfig {
            route_rules_path: Some(file.path().to_path_buf()),
            ..AuthzConfig::default()
        };
        assert!(matches!(config.load_route_table(), Err(ConfigError::InvalidRoutes { .. })));
    }

    #[test]
    fn route_file_with_misspelled_key_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "pathPattern": "/settings", "requiredPermission": ["settings.manage"] }}]"#
        )
        .unwrap();

        let config = AuthzConfig {
            route_rules_path: Some(file.path().to_path_buf()),
            ..AuthzConfig::default()
        };
        assert!(matches!(
            config.load_route_table(),
            Err(ConfigError::InvalidRoutes { source: AuthzError::RouteTable(_), .. })
        ));
    }

    #[test]
    fn route_file_with_external_redirect_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{ "pathPattern": "/audit", "requiredPermissions": ["audit.view"], "redirect": "https://elsewhere.example" }}]"#
        )
        .unwrap();

        let config = AuthzConfig {
            route_rules_path: Some(file.path().to_path_buf()),
            ..AuthzConfig::default()
        };
        assert!(matches!(
            config.load_route_table(),
            Err(ConfigError::InvalidRoutes { source: AuthzError::InvalidRedirect(_), .. })
        ));
    }

    #[test]
    fn missing_route_file_is_an_error() {
        let config = AuthzConfig {
            route_rules_path: Some(PathBuf::from("/nonexistent/rentwise/routes.json")),
            ..AuthzConfig::default()
        };
        assert!(matches!(config.load_route_table(), Err(ConfigError::ReadRoutes { .. })));
    }
}
