//! Connection settings.

use std::time::Duration;

use citra_rpc_proto::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding [`Config::host`].
pub const ENV_HOST: &str = "CITRA_RPC_HOST";

/// Environment variable overriding [`Config::port`].
pub const ENV_PORT: &str = "CITRA_RPC_PORT";

/// Where and how to connect to the emulator.
///
/// Defaults to `127.0.0.1:45987` with no socket timeouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// Host name or IP address of the emulator.
    pub host: String,
    /// TCP port of the emulator's RPC server.
    pub port: u16,
    /// Socket read timeout. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Socket write timeout. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl Config {
    /// Defaults overridden by `CITRA_RPC_HOST` / `CITRA_RPC_PORT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the
    /// environment keys.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            config.port = port
                .parse()
                .map_err(|e| Error::InvalidConfig(format!("{ENV_PORT}={port}: {e}")))?;
        }
        Ok(config)
    }

    /// Sets the host.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the socket read timeout.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the socket write timeout.
    #[must_use]
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Returns `host:port`, bracketing IPv6 literals.
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_loopback() {
        let c = Config::default();
        assert_eq!(c.address(), "127.0.0.1:45987");
        assert_eq!(c.read_timeout, None);
    }

    #[test]
    fn env_overrides() {
        let c = Config::from_lookup(|k| match k {
            ENV_HOST => Some("10.0.0.2".into()),
            ENV_PORT => Some("5000".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(c.address(), "10.0.0.2:5000");
    }

    #[test]
    fn empty_host_keeps_default() {
        let c = Config::from_lookup(|k| (k == ENV_HOST).then(String::new)).unwrap();
        assert_eq!(c.host, "127.0.0.1");
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(|k| (k == ENV_PORT).then(|| "99999".to_owned())).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn ipv6_address_is_bracketed() {
        assert_eq!(Config::default().host("::1").port(1).address(), "[::1]:1");
    }

    #[test]
    fn deserializes_partial_json() {
        let c: Config = serde_json::from_str(r#"{"port": 12345}"#).unwrap();
        assert_eq!(c, Config::default().port(12345));
    }
}
