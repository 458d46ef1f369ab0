//! Config version verification.
//!
//! # Data Flow
//! ```text
//! reconciler bumps the config version
//!     → generator.rs renders the probe server block carrying it
//!     → reconciler writes it next to the rest of the config and reloads NGINX
//!     → client.rs polls GET /configVersion over the unix socket
//!     → Ok once the new worker processes answer with the expected version
//! ```
//!
//! # Design Decisions
//! - The probe lives on a unix socket, never on a port that serves traffic
//! - Exact match on the version: anything else means stale workers are answering
//! - All fetch failures are transient while polling; only the deadline ends the wait

pub mod client;
pub mod generator;

use std::time::Duration;

pub use client::{VerifyClient, VerifyError};
pub use generator::VerifyConfigGenerator;

/// Socket the probe server block listens on and the client dials.
pub const DEFAULT_SOCKET_PATH: &str = "/var/lib/nginx/nginx-config-version.sock";

/// Path answered by the probe server block.
pub const CONFIG_VERSION_PATH: &str = "/configVersion";

/// `Host` header sent with probe requests.
pub const CONFIG_VERSION_HOST: &str = "config-version";

/// Delay between two polls of the probe.
pub const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Consecutive malformed probe responses tolerated before warning.
pub const MALFORMED_WARN_THRESHOLD: u32 = 5;
