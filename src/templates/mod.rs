//! Template execution subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     virtualserver.tmpl / transportserver.tmpl
//!     → compiled.rs (compile with helpers.rs registry)
//!     → executor.rs stores each as original + active
//!
//! per reconcile:
//!     VirtualServerConfig / TransportServerConfig / PassthroughHosts (model.rs)
//!     → executor.rs renders with the active template
//!     → bytes handed back to the caller
//!
//! custom template from the cluster:
//!     executor.rs compiles it, swaps it in only on success
//!     → rollback restores the startup original
//! ```
//!
//! # Design Decisions
//! - One handlebars registry per compiled template
//! - Strict mode: a missing field fails the render instead of printing nothing
//! - No HTML escaping, output is NGINX configuration

pub mod compiled;
pub mod executor;
pub mod helpers;
pub mod model;

pub use compiled::{CompiledTemplate, TemplateError, TemplateResult, TemplateSlot};
pub use executor::TemplateExecutor;
pub use model::{PassthroughHosts, TransportServerConfig, VirtualServerConfig};
