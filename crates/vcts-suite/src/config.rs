//! Runtime settings.
//!
//! Read from the environment by the binaries; the library itself never
//! touches process state. Tests build settings through
//! [`Settings::from_lookup`] instead of mutating the environment.

use std::time::Duration;

use url::Url;
use vcts_jsonld::ResolverConfig;

/// Default project title.
pub const DEFAULT_PROJECT_TITLE: &str = "VC Test-suite";
/// Default project version.
pub const DEFAULT_PROJECT_VERSION: &str = "v0";
/// Default context fetch timeout in seconds.
pub const DEFAULT_CONTEXT_TIMEOUT_SECS: u64 = 100;
/// Default bound on resolving all contexts of one document, in seconds.
pub const DEFAULT_CONTEXT_DEADLINE_SECS: u64 = 100;
/// Default API port.
pub const DEFAULT_PORT: u16 = 8080;

/// Engine and front-end settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub project_title: String,
    pub project_version: String,
    /// Base URL of the allure-docker-service API. `None` disables publishing.
    pub allure_api: Option<Url>,
    /// Upper bound for one context fetch.
    pub context_timeout: Duration,
    /// Upper bound for resolving all contexts of one document.
    pub context_deadline: Duration,
    /// Resolve contexts from the bundled snapshots only.
    pub offline: bool,
    /// Fetch contexts from loopback, private and link-local hosts. Never
    /// honoured by the HTTP front end.
    pub allow_private_hosts: bool,
    /// Listen port of the HTTP front end.
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_title: DEFAULT_PROJECT_TITLE.to_string(),
            project_version: DEFAULT_PROJECT_VERSION.to_string(),
            allure_api: None,
            context_timeout: Duration::from_secs(DEFAULT_CONTEXT_TIMEOUT_SECS),
            context_deadline: Duration::from_secs(DEFAULT_CONTEXT_DEADLINE_SECS),
            offline: false,
            allow_private_hosts: false,
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Variables:
    /// - `VCTS_PROJECT_TITLE` (default: `VC Test-suite`)
    /// - `VCTS_PROJECT_VERSION` (default: `v0`)
    /// - `ALLURE_API` (optional; absent disables publishing)
    /// - `VCTS_CONTEXT_TIMEOUT_SECS` (default: 100)
    /// - `VCTS_CONTEXT_DEADLINE_SECS` (default: 100)
    /// - `VCTS_OFFLINE` (default: false)
    /// - `VCTS_ALLOW_PRIVATE_HOSTS` (default: false)
    /// - `PORT` (default: 8080)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load settings through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let allure_api = match var("ALLURE_API") {
            None => None,
            Some(raw) => Some(parse_url("ALLURE_API", &raw)?),
        };
        let context_timeout = match var("VCTS_CONTEXT_TIMEOUT_SECS") {
            None => defaults.context_timeout,
            Some(raw) => parse_seconds("VCTS_CONTEXT_TIMEOUT_SECS", raw)?,
        };
        let context_deadline = match var("VCTS_CONTEXT_DEADLINE_SECS") {
            None => defaults.context_deadline,
            Some(raw) => parse_seconds("VCTS_CONTEXT_DEADLINE_SECS", raw)?,
        };
        let offline = match var("VCTS_OFFLINE") {
            None => defaults.offline,
            Some(raw) => parse_bool("VCTS_OFFLINE", &raw)?,
        };
        let allow_private_hosts = match var("VCTS_ALLOW_PRIVATE_HOSTS") {
            None => defaults.allow_private_hosts,
            Some(raw) => parse_bool("VCTS_ALLOW_PRIVATE_HOSTS", &raw)?,
        };
        let port = match var("PORT") {
            None => defaults.port,
            Some(raw) => parse_number("PORT", &raw)?,
        };

        Ok(Self {
            project_title: var("VCTS_PROJECT_TITLE").unwrap_or(defaults.project_title),
            project_version: var("VCTS_PROJECT_VERSION").unwrap_or(defaults.project_version),
            allure_api,
            context_timeout,
            context_deadline,
            offline,
            allow_private_hosts,
            port,
        })
    }
}

impl Settings {
    /// Context resolver behaviour derived from these settings. Bundled
    /// snapshots are always preloaded.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            timeout: self.context_timeout,
            deadline: self.context_deadline,
            offline: self.offline,
            preload_bundled: true,
            allow_private_hosts: self.allow_private_hosts,
        }
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var: var.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn parse_seconds(var: &str, raw: String) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_number(var, &raw)?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            var: var.to_string(),
            value: raw,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var: var.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let s = load(&[]).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.project_title, "VC Test-suite");
        assert_eq!(s.context_timeout, Duration::from_secs(100));
        assert!(s.allure_api.is_none());
        assert!(!s.resolver_config().allow_private_hosts);
    }

    #[test]
    fn overrides_are_applied() {
        let s = load(&[
            ("ALLURE_API", "https://allure.example/api"),
            ("VCTS_CONTEXT_TIMEOUT_SECS", "5"),
            ("VCTS_CONTEXT_DEADLINE_SECS", "20"),
            ("VCTS_OFFLINE", "true"),
            ("VCTS_ALLOW_PRIVATE_HOSTS", "yes"),
            ("PORT", "9000"),
            ("VCTS_PROJECT_VERSION", "v2"),
        ])
        .unwrap();
        assert_eq!(s.allure_api.as_ref().unwrap().as_str(), "https://allure.example/api");
        assert_eq!(s.context_timeout, Duration::from_secs(5));
        assert_eq!(s.context_deadline, Duration::from_secs(20));
        assert!(s.offline);
        assert!(s.allow_private_hosts);

        let config = s.resolver_config();
        assert_eq!(config.deadline, Duration::from_secs(20));
        assert!(config.allow_private_hosts);
        assert_eq!(s.port, 9000);
        assert_eq!(s.project_version, "v2");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let s = load(&[("ALLURE_API", "  "), ("PORT", "")]).unwrap();
        assert!(s.allure_api.is_none());
        assert_eq!(s.port, DEFAULT_PORT);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(load(&[("ALLURE_API", "not a url")]), Err(ConfigError::InvalidUrl(..))));
        assert!(matches!(load(&[("ALLURE_API", "ftp://x")]), Err(ConfigError::InvalidUrl(..))));
        assert!(matches!(load(&[("PORT", "http")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(load(&[("VCTS_OFFLINE", "maybe")]), Err(ConfigError::Invalid { .. })));
        assert!(matches!(
            load(&[("VCTS_CONTEXT_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            load(&[("VCTS_CONTEXT_DEADLINE_SECS", "0")]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
