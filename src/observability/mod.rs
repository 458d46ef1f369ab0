//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! templates / verify
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (wait outcomes, fetch failures)
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted messages
//! - Probe failures are debug level: they are expected during every reload

pub mod logging;
pub mod metrics;
