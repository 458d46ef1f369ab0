//! Typed inputs for the route templates.
//!
//! These are produced by the resource translation layer and arrive already
//! validated; nothing here checks them. Every field is always serialized
//! (`None` becomes `null`) so that templates running in strict mode only fail
//! on fields that genuinely do not exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// TLS passthrough hostname mapped to the unix socket of its stream server.
///
/// A `BTreeMap` keeps rendered output sorted by hostname.
pub type PassthroughHosts = BTreeMap<String, String>;

/// NGINX configuration for a VirtualServer resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VirtualServerConfig {
    /// Upstream groups referenced by locations.
    pub upstreams: Vec<Upstream>,

    /// The `server` block.
    pub server: Server,

    /// `map` blocks emitted ahead of the server.
    pub maps: Vec<Map>,
}

/// An HTTP upstream group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Upstream {
    /// Upstream name as referenced by `proxy_pass`.
    pub name: String,

    /// Member servers.
    pub servers: Vec<UpstreamServer>,

    /// Load balancing directive, e.g. `least_conn`.
    pub lb_method: Option<String>,

    /// Idle keepalive connections per worker.
    pub keepalive: Option<u32>,
}

/// One member of an upstream group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamServer {
    /// `host:port` or `unix:/path`.
    pub address: String,

    /// Failures before the server is considered unavailable.
    pub max_fails: u32,

    /// Window for `max_fails`, e.g. `10s`.
    pub fail_timeout: String,
}

/// The `server` block of a VirtualServer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Server {
    /// `server_name` value.
    pub server_name: String,

    /// Status zone name.
    pub status_zone: String,

    /// Plain HTTP listen port.
    pub http_port: u16,

    /// Accept the PROXY protocol on listeners.
    pub proxy_protocol: bool,

    /// TLS settings; `None` for plain HTTP.
    pub ssl: Option<Ssl>,

    /// When set the HTTPS listener is the passthrough unix socket.
    pub tls_passthrough: bool,

    /// Raw directives appended to the server block.
    pub snippets: Vec<String>,

    /// Request locations.
    pub locations: Vec<Location>,
}

/// TLS settings for a server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Ssl {
    /// HTTPS listen port.
    pub https_port: u16,

    /// Certificate path.
    pub certificate: String,

    /// Private key path.
    pub certificate_key: String,

    /// Enabled protocol versions.
    pub protocols: Vec<String>,
}

/// One `location` block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Location {
    /// Location path or pattern.
    pub path: String,

    /// One of `prefix`, `exact`, `regex`, `regex_case_insensitive`.
    pub match_type: String,

    /// `proxy_pass` target, e.g. `http://vs_default_cafe_tea`.
    pub proxy_pass: String,

    /// `proxy_connect_timeout`.
    pub proxy_connect_timeout: Option<String>,

    /// `proxy_read_timeout`.
    pub proxy_read_timeout: Option<String>,

    /// `proxy_send_timeout`.
    pub proxy_send_timeout: Option<String>,

    /// Headers forwarded upstream.
    pub proxy_set_headers: Vec<Header>,

    /// Raw directives appended to the location.
    pub snippets: Vec<String>,
}

/// A header name and value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// A `map` block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Map {
    /// Source expression, e.g. `$http_x_version`.
    pub source: String,

    /// Target variable.
    pub variable: String,

    /// Ordered value/result pairs.
    pub parameters: Vec<MapParameter>,
}

/// One line of a `map` block.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapParameter {
    pub value: String,
    pub result: String,
}

/// NGINX stream configuration for a TransportServer resource.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportServerConfig {
    /// Upstream groups.
    pub upstreams: Vec<StreamUpstream>,

    /// The stream `server` block.
    pub server: StreamServer,
}

/// A stream upstream group.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamUpstream {
    pub name: String,
    pub servers: Vec<UpstreamServer>,
    pub lb_method: Option<String>,
}

/// The stream `server` block of a TransportServer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StreamServer {
    /// Listen target: a port, or `unix:/path` for TLS passthrough.
    pub listen: String,

    /// Listen for UDP instead of TCP.
    pub udp: bool,

    /// Status zone name.
    pub status_zone: String,

    /// Upstream name.
    pub proxy_pass: String,

    /// `proxy_timeout`.
    pub proxy_timeout: String,

    /// `proxy_connect_timeout`.
    pub proxy_connect_timeout: String,

    /// Attempts to pass a connection to the next upstream server.
    pub proxy_next_upstream_tries: u32,

    /// Raw directives appended to the server block.
    pub snippets: Vec<String>,
}
