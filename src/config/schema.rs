//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::verify::DEFAULT_SOCKET_PATH;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ControllerConfig {
    /// Where the route templates are loaded from at startup.
    pub templates: TemplatesConfig,

    /// Config version verification settings.
    pub verify: VerifyConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Template file locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// VirtualServer template file.
    pub virtual_server_path: PathBuf,

    /// TransportServer template file.
    pub transport_server_path: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            virtual_server_path: PathBuf::from("templates/virtualserver.tmpl"),
            transport_server_path: PathBuf::from("templates/transportserver.tmpl"),
        }
    }
}

/// Config version verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Unix socket shared by the probe server block and the client.
    pub socket_path: PathBuf,

    /// Maximum time to wait for NGINX to report a new version, in milliseconds.
    pub timeout_ms: u64,
}

impl VerifyConfig {
    /// The wait timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            timeout_ms: 60_000,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
