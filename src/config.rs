//! Connection settings for the Sandbox
//!
//! A [`Config`] names the Sandbox host and holds the developer
//! [`Credentials`] used to sign every request. The library never reads
//! files or the environment; callers build the config themselves or
//! deserialize it from a source of their choosing.
//!
//! # Example
//!
//! ```
//! use sprintkit::config::Config;
//!
//! let config = Config::new("my-key", "my-secret").with_protocol("https");
//! assert_eq!(
//!     config.endpoint_url("presence.json"),
//!     "https://test.sprintdevelopersandbox.com/developerSandbox/resources/v1/presence.json"
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::v1::API_PATH;

/// Default URL scheme
pub const DEFAULT_PROTOCOL: &str = "http";
/// Default Sandbox host
pub const DEFAULT_HOST: &str = "test.sprintdevelopersandbox.com";

/// Developer key and shared secret issued by the Sandbox
///
/// The secret never leaves the process: it only feeds the request
/// signature and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    pub fn new<K: Into<String>, S: Into<String>>(key: K, secret: S) -> Self {
        Credentials {
            key: key.into(),
            secret: secret.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.into()
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}

fn default_path() -> String {
    API_PATH.into()
}

/// Sandbox connection settings
///
/// Requests go to `<protocol>://<host><path>/<endpoint>`. Only the
/// credentials are required when deserializing; every other field falls
/// back to the public test Sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    credentials: Credentials,
    #[serde(default = "default_protocol")]
    protocol: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_path")]
    path: String,
}

impl Config {
    /// Creates a config for the default Sandbox host
    ///
    /// # Arguments
    /// * `key` - Developer key
    /// * `secret` - Shared secret used for signing
    pub fn new<K: Into<String>, S: Into<String>>(key: K, secret: S) -> Self {
        Self::from_credentials(Credentials::new(key, secret))
    }

    pub fn from_credentials(credentials: Credentials) -> Self {
        Config {
            credentials,
            protocol: default_protocol(),
            host: default_host(),
            path: default_path(),
        }
    }

    /// Sets the URL scheme, `http` or `https`
    pub fn with_protocol<S: AsRef<str>>(mut self, protocol: S) -> Self {
        self.protocol = protocol.as_ref().into();
        self
    }

    pub fn with_host<S: AsRef<str>>(mut self, host: S) -> Self {
        self.host = host.as_ref().into();
        self
    }

    /// Sets the resource path, e.g. `/developerSandbox/resources/v1`
    pub fn with_path<S: AsRef<str>>(mut self, path: S) -> Self {
        self.path = path.as_ref().into();
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn key(&self) -> &str {
        self.credentials.key()
    }

    pub fn secret(&self) -> &str {
        self.credentials.secret()
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `<protocol>://<host><path>`, without a trailing slash
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}{}",
            self.protocol,
            self.host,
            self.path.trim_end_matches('/')
        )
    }

    /// Full URL of a Sandbox endpoint such as `geofence/list.json`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url(), endpoint.trim_start_matches('/'))
    }
}
