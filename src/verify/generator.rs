//! Config version probe generation.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::templates::{CompiledTemplate, TemplateResult, TemplateSlot};
use crate::verify::{CONFIG_VERSION_PATH, DEFAULT_SOCKET_PATH};

const CONFIG_VERSION_TEMPLATE: &str = r#"server {
    listen unix:{{socket_path}};
    access_log off;

    location {{path}} {
        return 200 {{version}};
    }
}
map $http_x_expected_config_version $config_version_mismatch {
    "{{version}}" "";
    default "mismatch";
}
"#;

#[derive(Serialize)]
struct ProbeValues<'a> {
    socket_path: &'a str,
    path: &'static str,
    version: u64,
}

/// Generates the probe server block that reports the config version.
#[derive(Debug)]
pub struct VerifyConfigGenerator {
    template: CompiledTemplate,
    socket_path: PathBuf,
}

impl VerifyConfigGenerator {
    /// Compile the probe template for the default socket.
    pub fn new() -> TemplateResult<Self> {
        Self::with_socket_path(DEFAULT_SOCKET_PATH)
    }

    /// Compile the probe template for a specific socket.
    ///
    /// The path must be the one the [`VerifyClient`](crate::verify::VerifyClient) dials.
    pub fn with_socket_path(socket_path: impl AsRef<Path>) -> TemplateResult<Self> {
        let template = CompiledTemplate::compile(TemplateSlot::VersionProbe, CONFIG_VERSION_TEMPLATE)?;
        Ok(Self {
            template,
            socket_path: socket_path.as_ref().to_path_buf(),
        })
    }

    /// Socket the generated server block listens on.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Render the probe configuration for `version`.
    pub fn generate_version_config(&self, version: u64) -> TemplateResult<Vec<u8>> {
        let socket_path = self.socket_path.to_string_lossy();
        self.template.render(&ProbeValues {
            socket_path: &socket_path,
            path: CONFIG_VERSION_PATH,
            version,
        })
    }
}
