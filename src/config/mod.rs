//! Process configuration sourced from environment variables.
//!
//! Resolved once at startup into an owned [`Config`] that rides along in the
//! shared application state. Every knob has a documented default so the
//! service runs with no environment at all:
//!
//! | Variable      | Default         |
//! |---------------|-----------------|
//! | `HOST`        | `0.0.0.0`       |
//! | `PORT`        | `5000`          |
//! | `DEBUG`       | `false`         |
//! | `API_KEY`     | `demo-api-key`  |
//! | `ENVIRONMENT` | `development`   |

use std::env;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_API_KEY: &str = "demo-api-key";
const DEFAULT_ENVIRONMENT: &str = "development";

/// Resolved process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Enables verbose logging when no `RUST_LOG` filter is set.
    pub debug: bool,
    /// Shared secret gating the message routes.
    pub api_key: String,
    /// Deployment label echoed by the health and stats endpoints.
    pub environment: String,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through an injected lookup function.
    ///
    /// Tests pass a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT").map(|raw| raw.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(_)) => {
                tracing::warn!("ignoring unparseable PORT, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port,
            debug: lookup("DEBUG").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            api_key: lookup("API_KEY").unwrap_or_else(|| DEFAULT_API_KEY.to_owned()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned()),
        }
    }

    /// Returns the `host:port` string the server binds to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
