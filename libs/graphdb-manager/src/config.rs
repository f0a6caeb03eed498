//! Connection settings for a managed server.
//!
//! Plain serde structs; the binary layers them with figment (defaults, YAML
//! file, `GDM__*` environment, command line).

use gdm_http::{HttpClientConfig, TransportSecurity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server URL used when none is configured
pub const DEFAULT_SERVER_URL: &str = "http://localhost:7474/";

/// Management path relative to the server URL
pub const MANAGE_PATH: &str = "db/manage/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// Base URL of the database server
    pub url: String,
    /// Management URL; derived from `url` when unset
    pub manage_url: Option<String>,
    pub http: HttpSettings,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_owned(),
            manage_url: None,
            http: HttpSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_body_size: usize,
    /// Accept `http://` URLs. On by default: management endpoints are
    /// usually served without TLS on the database host.
    pub allow_insecure_http: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("gdm/", env!("CARGO_PKG_VERSION")).to_owned(),
            max_body_size: 1024 * 1024,
            allow_insecure_http: true,
        }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Client configuration for these settings
    #[must_use]
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.timeout(),
            max_body_size: self.max_body_size,
            user_agent: self.user_agent.clone(),
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            ..HttpClientConfig::management()
        }
    }
}
