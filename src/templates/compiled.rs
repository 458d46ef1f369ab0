//! Compiled templates and their error type.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

use crate::templates::helpers;

/// Errors produced while loading, compiling or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file could not be read.
    #[error("failed to read template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template body is not valid template syntax.
    #[error("failed to compile template {name}: {source}")]
    Compile {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// Template could not be executed against the given data.
    #[error("failed to render template {name}: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}

/// Result type for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// The named roles a compiled template can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateSlot {
    /// HTTP routing for a VirtualServer resource.
    VirtualServerRoute,
    /// Stream routing for a TransportServer resource.
    TransportServerRoute,
    /// TLS passthrough host to unix socket map.
    PassthroughHostMap,
    /// Config version probe server block.
    VersionProbe,
}

impl TemplateSlot {
    /// Name the template is registered under.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateSlot::VirtualServerRoute => "virtualServerTemplate",
            TemplateSlot::TransportServerRoute => "transportServerTemplate",
            TemplateSlot::PassthroughHostMap => "unixSockets",
            TemplateSlot::VersionProbe => "configVersionTemplate",
        }
    }
}

impl fmt::Display for TemplateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A template compiled once and rendered many times.
///
/// Each instance owns its own registry holding exactly one template plus the
/// fixed helper set. Output is proxy configuration, so HTML escaping is off,
/// and strict mode turns references to absent fields into render errors.
pub struct CompiledTemplate {
    slot: TemplateSlot,
    registry: Handlebars<'static>,
}

impl CompiledTemplate {
    /// Compile `source` for the given slot.
    pub fn compile(slot: TemplateSlot, source: &str) -> TemplateResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        helpers::register(&mut registry);

        registry
            .register_template_string(slot.name(), source)
            .map_err(|e| TemplateError::Compile {
                name: slot.name(),
                source: Box::new(e),
            })?;

        Ok(Self { slot, registry })
    }

    /// Read a template file from disk and compile it for the given slot.
    pub fn from_file(slot: TemplateSlot, path: &Path) -> TemplateResult<Self> {
        let source = fs::read_to_string(path).map_err(|e| TemplateError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let template = Self::compile(slot, &source)?;
        tracing::debug!(slot = %slot, path = %path.display(), "Template compiled from file");
        Ok(template)
    }

    /// Execute the template against `data`.
    ///
    /// Nothing is returned on failure; a partially rendered buffer is dropped.
    pub fn render<T: Serialize>(&self, data: &T) -> TemplateResult<Vec<u8>> {
        self.registry
            .render(self.slot.name(), data)
            .map(String::into_bytes)
            .map_err(|e| TemplateError::Render {
                name: self.slot.name(),
                source: Box::new(e),
            })
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}
