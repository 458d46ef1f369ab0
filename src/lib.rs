//! NGINX configuration rendering and reload confirmation.
//!
//! Renders VirtualServer/TransportServer configuration and the TLS passthrough
//! host map from typed inputs, and confirms that a reloaded NGINX is actually
//! serving a given config version before the caller moves on.

pub mod config;
pub mod observability;
pub mod templates;
pub mod verify;

pub use config::ControllerConfig;
pub use templates::TemplateExecutor;
pub use verify::{VerifyClient, VerifyConfigGenerator, VerifyError};
