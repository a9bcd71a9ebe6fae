//! Server configuration.
//!
//! Sources, lowest to highest precedence:
//!
//! 1. built-in defaults (`0.0.0.0:8000`, no-match answered with `404`)
//! 2. an optional TOML file
//! 3. the `STRADA_ADDR` environment variable
//!
//! ```toml
//! addr = "127.0.0.1:8080"
//! no_match_status = 404
//! ```

use std::net::SocketAddr;
use std::path::Path;

use http::StatusCode;
use serde::Deserialize;

use crate::error::Error;

/// Environment variable overriding [`Config::addr`].
pub const ADDR_ENV: &str = "STRADA_ADDR";

const DEFAULT_ADDR: &str = "0.0.0.0:8000";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Listen address as `host:port`.
    pub addr: String,
    /// Status the server answers with when no route matches.
    pub no_match_status: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            no_match_status: StatusCode::NOT_FOUND.as_u16(),
        }
    }
}

impl Config {
    /// Parses and validates a TOML document. Environment is not consulted.
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` as TOML without environment overrides.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reads `path` as TOML, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), Error> {
        self.no_match_status().map(|_| ())
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup(ADDR_ENV).filter(|a| !a.trim().is_empty()) {
            self.addr = addr.trim().to_owned();
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        self.addr.parse().map_err(|source| Error::Addr { addr: self.addr.clone(), source })
    }

    /// The no-match status. Must be a 4xx or 5xx code so a missed route can
    /// never reach the wire as a success.
    pub fn no_match_status(&self) -> Result<StatusCode, Error> {
        StatusCode::from_u16(self.no_match_status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .ok_or(Error::InvalidStatus(self.no_match_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_8000() {
        let config = Config::default();
        assert_eq!(config.socket_addr().unwrap(), "0.0.0.0:8000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.no_match_status().unwrap(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn toml_fields_are_optional() {
        let config = Config::from_toml_str(r#"no_match_status = 500"#).unwrap();
        assert_eq!(config.addr, "0.0.0.0:8000");
        assert_eq!(config.no_match_status().unwrap(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn out_of_range_no_match_status_is_rejected() {
        let err = Config::from_toml_str("no_match_status = 42").unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(42)));
    }

    #[test]
    fn success_no_match_status_is_rejected() {
        let err = Config::from_toml_str("no_match_status = 200").unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(200)));
    }

    #[test]
    fn redirect_no_match_status_is_rejected() {
        let err = Config::from_toml_str("no_match_status = 302").unwrap_err();
        assert!(matches!(err, Error::InvalidStatus(302)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str(r#"port = 8000"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_addr() {
        let mut config = Config::from_toml_str(r#"addr = "127.0.0.1:1""#).unwrap();
        config.apply_overrides(|key| (key == ADDR_ENV).then(|| " 127.0.0.1:9000 ".to_owned()));
        assert_eq!(config.addr, "127.0.0.1:9000");

        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.addr, "127.0.0.1:9000");
    }

    #[test]
    fn bad_addr_and_status() {
        let config = Config { addr: "localhost".into(), no_match_status: 42 };
        assert!(matches!(config.socket_addr(), Err(Error::Addr { .. })));
        assert!(matches!(config.no_match_status(), Err(Error::InvalidStatus(42))));
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let path = std::env::temp_dir().join(format!("strada-config-{}.toml", std::process::id()));
        std::fs::write(&path, "addr = \"127.0.0.1:8123\"\nno_match_status = 503\n").unwrap();
        let config = Config::from_file(&path);
        std::fs::remove_file(&path).unwrap();

        let mut config = config.unwrap();
        assert_eq!(config.addr, "127.0.0.1:8123");
        assert_eq!(config.no_match_status().unwrap(), StatusCode::SERVICE_UNAVAILABLE);

        config.apply_overrides(|_| None);
        assert_eq!(config.addr, "127.0.0.1:8123");
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = Config::from_file("/nonexistent/strada.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
