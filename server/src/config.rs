//! Server settings: an optional flat `itemapi.toml`, then environment
//! overrides.
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 5000
//! max_body_bytes = 2097152
//! expose_fault_detail = true
//! log_filter = "itemapi=info"
//! ```

use serde::Deserialize;

pub const CONFIG_FILE: &str = "itemapi.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Largest request body read before answering 413.
    pub max_body_bytes: usize,
    /// Echo the fault message in 500 bodies. When off, clients get a generic
    /// message and the detail only reaches the log.
    pub expose_fault_detail: bool,
    /// `EnvFilter` directive for the tracing subscriber.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_bytes: 2 * 1024 * 1024,
            expose_fault_detail: true,
            log_filter: "itemapi=info,itemapi_server=info,itemapi_core=info,tower_http=debug"
                .to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read itemapi.toml")]
    Read(#[source] std::io::Error),
    #[error("itemapi.toml is not valid TOML")]
    Parse(#[source] toml::de::Error),
    #[error("{name} has unusable value {value:?}")]
    Env { name: &'static str, value: String },
    #[error("{0} must be non-zero")]
    Zero(&'static str),
}

impl Config {
    /// Read `itemapi.toml` from the working directory (if present) and
    /// apply the process environment on top.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::fs::read_to_string(CONFIG_FILE) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(ConfigError::Read(err)),
        };
        Self::resolve(file.as_deref(), |name| std::env::var(name).ok())
    }

    /// Build a configuration from optional file contents and an environment
    /// lookup.
    ///
    /// | variable                      | field                 |
    /// |-------------------------------|-----------------------|
    /// | `ITEMAPI_HOST`                | `host`                |
    /// | `PORT`, then `ITEMAPI_PORT`   | `port`                |
    /// | `ITEMAPI_EXPOSE_FAULT_DETAIL` | `expose_fault_detail` |
    /// | `RUST_LOG`                    | `log_filter`          |
    pub fn resolve(
        file: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(content) => toml::from_str(content).map_err(ConfigError::Parse)?,
            None => Self::default(),
        };

        if let Some(host) = env("ITEMAPI_HOST") {
            config.host = host;
        }
        for name in ["PORT", "ITEMAPI_PORT"] {
            if let Some(value) = env(name) {
                config.port = value.parse().map_err(|_| ConfigError::Env { name, value })?;
            }
        }
        if let Some(value) = env("ITEMAPI_EXPOSE_FAULT_DETAIL") {
            config.expose_fault_detail = parse_flag(&value).ok_or(ConfigError::Env {
                name: "ITEMAPI_EXPOSE_FAULT_DETAIL",
                value,
            })?;
        }
        if let Some(filter) = env("RUST_LOG") {
            config.log_filter = filter;
        }

        if config.port == 0 {
            return Err(ConfigError::Zero("port"));
        }
        if config.max_body_bytes == 0 {
            return Err(ConfigError::Zero("max_body_bytes"));
        }
        Ok(config)
    }

    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn without_file_or_env_listens_on_5000_and_exposes_faults() {
        let config = Config::resolve(None, env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert!(config.expose_fault_detail);
    }

    #[test]
    fn file_values_fill_in_over_defaults() {
        let file = "
            port = 8080
            expose_fault_detail = false
        ";
        let config = Config::resolve(Some(file), env(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.expose_fault_detail);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn environment_wins_over_the_file() {
        let file = "host = '10.0.0.1'\nport = 8080";
        let config = Config::resolve(
            Some(file),
            env(&[("ITEMAPI_HOST", "127.0.0.1"), ("PORT", "9000")]),
        )
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn itemapi_port_takes_precedence_over_port() {
        let config =
            Config::resolve(None, env(&[("PORT", "9000"), ("ITEMAPI_PORT", "9001")])).unwrap();
        assert_eq!(config.port, 9001);
    }

    #[test]
    fn expose_fault_detail_flag_accepts_common_spellings() {
        for (value, expected) in [
            ("0", false),
            ("false", false),
            ("OFF", false),
            ("no", false),
            ("1", true),
            ("True", true),
            (" on ", true),
            ("yes", true),
        ] {
            let config =
                Config::resolve(None, env(&[("ITEMAPI_EXPOSE_FAULT_DETAIL", value)])).unwrap();
            assert_eq!(config.expose_fault_detail, expected, "value {value:?}");
        }
    }

    #[test]
    fn unrecognized_flag_is_an_error() {
        let err =
            Config::resolve(None, env(&[("ITEMAPI_EXPOSE_FAULT_DETAIL", "maybe")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env { name: "ITEMAPI_EXPOSE_FAULT_DETAIL", .. }
        ));
    }

    #[test]
    fn unparseable_port_is_an_error() {
        let err = Config::resolve(None, env(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err.to_string(), r#"PORT has unusable value "http""#);
    }

    #[test]
    fn zero_port_and_body_limit_are_rejected() {
        let err = Config::resolve(None, env(&[("PORT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Zero("port")));

        let err = Config::resolve(Some("max_body_bytes = 0"), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Zero("max_body_bytes")));
    }

    #[test]
    fn rust_log_replaces_the_filter() {
        let config = Config::resolve(None, env(&[("RUST_LOG", "debug")])).unwrap();
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let err = Config::resolve(Some("port = {{{"), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
