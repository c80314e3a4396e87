//! Client configuration: where the backend lives.
//!
//! The app always talks to one host on a fixed port. Both can be overridden
//! through `KONF_ENDPOINT` and `KONF_PORT`, or by deserializing a
//! `ClientConfig` from whatever settings file the host already has.

use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "http://localhost";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            port: default_port(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with `KONF_ENDPOINT` / `KONF_PORT`. An unparsable
    /// port falls back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("KONF_ENDPOINT").filter(|e| !e.is_empty()) {
            config.endpoint = endpoint;
        }
        if let Some(port) = lookup("KONF_PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config
    }

    /// `endpoint` with the port appended. A missing scheme defaults to http.
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        if endpoint.contains("://") {
            format!("{endpoint}:{}", self.port)
        } else {
            format!("http://{endpoint}:{}", self.port)
        }
    }
}
