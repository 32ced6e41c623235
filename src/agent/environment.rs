//! Agent process environment
//!
//! Built once per run from the current process environment with the proxy
//! variables overlaid, then shared read-only by every invocation.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};

use crate::config::ProxyConfig;

/// Immutable environment passed to every agent process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentEnvironment {
    vars: BTreeMap<OsString, OsString>,
}

impl AgentEnvironment {
    /// Copy of the current process environment with the proxy overlay applied
    pub fn from_current(proxy: &ProxyConfig) -> Self {
        Self::from_vars(std::env::vars_os()).with_overlay(proxy.variables())
    }

    /// Environment built from an explicit variable set
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Overlay variables, replacing existing values
    pub fn with_overlay<K, V>(mut self, overlay: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
    {
        for (key, value) in overlay {
            self.vars.insert(key.into(), value.into());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_replaces_existing_values() {
        let env = AgentEnvironment::from_vars([("PATH", "/bin"), ("http_proxy", "old")])
            .with_overlay([("http_proxy", "http://127.0.0.1:10080")]);

        assert_eq!(env.get("PATH"), Some(OsStr::new("/bin")));
        assert_eq!(
            env.get("http_proxy"),
            Some(OsStr::new("http://127.0.0.1:10080"))
        );
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_from_current_applies_proxy_overlay() {
        let proxy = ProxyConfig::default();
        let env = AgentEnvironment::from_current(&proxy);

        assert_eq!(
            env.get("https_proxy"),
            Some(OsStr::new("http://127.0.0.1:10080"))
        );
        assert_eq!(
            env.get("http_proxy"),
            Some(OsStr::new("http://127.0.0.1:10080"))
        );
        assert_eq!(
            env.get("all_proxy"),
            Some(OsStr::new("socks5://127.0.0.1:10081"))
        );
    }

    #[test]
    fn test_disabled_proxy_leaves_environment_untouched() {
        let proxy = ProxyConfig {
            enabled: false,
            ..ProxyConfig::default()
        };
        let base = AgentEnvironment::from_vars([("HOME", "/home/reviewer")]);
        let env = base.clone().with_overlay(proxy.variables());
        assert_eq!(env, base);
    }
}
