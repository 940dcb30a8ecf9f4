//! Parsing a remote target spec: `host::module/path` or
//! `rsync://host[:port]/module/path`, the two forms the original tool
//! accepts for naming a daemon-mode module.

use crate::error::CliError;

/// The default daemon port, matching the long-standing registered port for
/// the rsync protocol.
pub const DEFAULT_PORT: u16 = 873;

/// A parsed remote target: enough to open a connection and request a
/// module by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    /// The daemon's hostname or address.
    pub host: String,
    /// The daemon's port.
    pub port: u16,
    /// The requested module name.
    pub module: String,
    /// The path within the module, if any.
    pub path: String,
}

impl RemoteTarget {
    /// Renders `host:port` for use with [`std::net::TcpStream::connect`].
    #[must_use]
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses `spec` as a remote target if it matches either recognized form,
/// returning `None` for anything else (a plain local path).
pub fn parse(spec: &str) -> Result<Option<RemoteTarget>, CliError> {
    if let Some(rest) = spec.strip_prefix("rsync://") {
        return parse_url_form(spec, rest).map(Some);
    }
    if let Some((host, rest)) = spec.split_once("::") {
        return parse_double_colon_form(spec, host, rest).map(Some);
    }
    Ok(None)
}

fn parse_url_form(original: &str, rest: &str) -> Result<RemoteTarget, CliError> {
    let (host_part, path_part) = rest
        .split_once('/')
        .ok_or_else(|| CliError::MalformedTarget(original.to_string(), "missing module after host"))?;
    let (host, port) = split_host_port(host_part);
    let (module, path) = path_part.split_once('/').unwrap_or((path_part, ""));
    if module.is_empty() {
        return Err(CliError::MalformedTarget(original.to_string(), "empty module name"));
    }
    Ok(RemoteTarget { host: host.to_string(), port, module: module.to_string(), path: path.to_string() })
}

fn parse_double_colon_form(original: &str, host: &str, rest: &str) -> Result<RemoteTarget, CliError> {
    if host.is_empty() {
        return Err(CliError::MalformedTarget(original.to_string(), "empty host"));
    }
    let (module, path) = rest.split_once('/').unwrap_or((rest, ""));
    if module.is_empty() {
        return Err(CliError::MalformedTarget(original.to_string(), "empty module name"));
    }
    let (host, port) = split_host_port(host);
    Ok(RemoteTarget { host: host.to_string(), port, module: module.to_string(), path: path.to_string() })
}

fn split_host_port(host_part: &str) -> (&str, u16) {
    match host_part.rsplit_once(':') {
        Some((host, port_str)) => port_str.parse().map_or((host_part, DEFAULT_PORT), |port| (host, port)),
        None => (host_part, DEFAULT_PORT),
    }
}
