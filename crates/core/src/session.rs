//! Sequencing the daemon-mode session handshake (spec §4.2) for either
//! role, from the version banner through the checksum seed.
//!
//! The pre-arguments phase is line-oriented and operates directly on the
//! raw transport; once the compatibility-flags byte and checksum seed have
//! been exchanged, the caller wraps the same transport in a
//! [`rsync_io::DuplexChannel`] for the multiplexed transfer phase. This
//! module only performs that wrapping for the caller at the very end, by
//! returning the negotiated [`SessionParams`] alongside the still-unwrapped
//! transport.

use std::io::{Read, Write};

use protocol::CompatFlags;
use rand::RngCore;
use rsync_io::handshake::{
    self, DaemonStatus, compute_auth_digest, decode_challenge, encode_challenge,
    format_auth_response, format_version_banner, generate_challenge, parse_version_banner,
    read_line, write_line,
};
use zeroize::Zeroize;

use crate::error::CoreError;

/// One module advertised by a daemon's empty-name listing (spec §4.2 step
/// 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleListing {
    /// The module's name.
    pub name: String,
    /// The module's advertised comment, if any.
    pub comment: String,
}

/// Parameters negotiated during the handshake, needed to drive the
/// multiplexed transfer phase that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionParams {
    /// The compatibility-flags byte the server sent (spec §4.2 step 7).
    pub compat_flags: CompatFlags,
    /// The 4-byte checksum seed mixed into per-block MD5 (spec §4.2 step
    /// 8).
    pub checksum_seed: u32,
}

/// Credentials supplied by the client for a daemon module requiring
/// authentication.
pub struct Credentials {
    /// The username sent in the authentication response.
    pub username: String,
    /// The password, zeroed after use.
    password: Vec<u8>,
}

impl Credentials {
    /// Builds a credential pair from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<Vec<u8>>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Client-side options controlling how the argument list is built (spec
/// §4.2 step 5/6).
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Whether to request incremental recursion (`i` compat letter).
    pub recurse: bool,
    /// Whether the peer should act as sender.
    pub sender: bool,
    /// Verbosity letters inserted before `e.<compat-letters>`, e.g. `"vv"`.
    pub verbosity: String,
    /// Additional options forwarded verbatim after the compat argument.
    pub extra_args: Vec<String>,
    /// Unnamed file/path arguments, sent last.
    pub paths: Vec<String>,
}

impl ClientOptions {
    /// Builds the compat-letters block for `-e.<letters>` (spec §4.2 step
    /// 6): `i` for incremental-recurse, `L` for symlink-times, `s` for
    /// symlink-iconv, `f` for safe-file-list. This implementation always
    /// requests `L`, `s`, and `f`, and `i` iff `recurse` is set.
    fn compat_letters(&self) -> String {
        let mut letters = String::from(".");
        if self.recurse {
            letters.push('i');
        }
        letters.push_str("Lsf");
        letters
    }

    /// Renders the full `--server [--sender] -<verbosity>e.<letters> ...`
    /// argument list, NUL-terminated per argument with a trailing empty
    /// terminator (spec §4.2 step 5).
    #[must_use]
    pub fn render_argument_list(&self) -> Vec<String> {
        let mut args = vec!["--server".to_string()];
        if self.sender {
            args.push("--sender".to_string());
        }
        args.push(format!("-{}e{}", self.verbosity, self.compat_letters()));
        args.extend(self.extra_args.iter().cloned());
        args.extend(self.paths.iter().cloned());
        args
    }
}

/// Runs the client side of the handshake against a daemon-mode peer,
/// through the checksum seed (spec §4.2 steps 1, 3-8; step 2 is driven
/// separately by [`request_module_listing`] or the `module` argument here).
pub fn perform_client_handshake<T: Read + Write>(
    transport: &mut T,
    module: &str,
    credentials: Option<&Credentials>,
    options: &ClientOptions,
) -> Result<SessionParams, CoreError> {
    write_line(transport, format_version_banner().trim_end_matches('\n'))?;
    let peer_banner = read_line(transport)?;
    let (peer_major, _peer_minor) = parse_version_banner(&peer_banner)?;
    if peer_major < handshake::BANNER_MAJOR {
        return Err(CoreError::ServerError(format!(
            "peer protocol version {peer_major} is older than the minimum supported version {}",
            handshake::BANNER_MAJOR
        )));
    }

    write_line(transport, module)?;

    loop {
        let line = read_line(transport)?;
        match DaemonStatus::parse(&line) {
            DaemonStatus::AuthRequired { challenge } => {
                let creds = credentials.ok_or(CoreError::AuthenticationFailed)?;
                let decoded = decode_challenge(&challenge)?;
                let response = format_auth_response(&creds.username, &creds.password, &decoded);
                write_line(transport, response.trim_end_matches('\n'))?;
            }
            DaemonStatus::Ok => break,
            DaemonStatus::Error(message) => return Err(CoreError::ServerError(message)),
            DaemonStatus::Exit => {
                return Err(CoreError::ModuleNotFound(module.to_string()));
            }
            DaemonStatus::Motd(text) => {
                logging::record(logging::Level::Info, text);
            }
        }
    }

    for arg in options.render_argument_list() {
        write_line(transport, &arg)?;
    }
    write_line(transport, "")?;

    let mut flag_byte = [0u8; 1];
    transport.read_exact(&mut flag_byte).map_err(rsync_io::IoError::from)?;
    let compat_flags = CompatFlags::from_bits(flag_byte[0]);
    if options.recurse && !compat_flags.contains(CompatFlags::INC_RECURSE) {
        return Err(CoreError::RecursionNotSupported);
    }

    let mut seed_bytes = [0u8; 4];
    transport.read_exact(&mut seed_bytes).map_err(rsync_io::IoError::from)?;
    let checksum_seed = u32::from_le_bytes(seed_bytes);

    Ok(SessionParams { compat_flags, checksum_seed })
}

/// Requests the empty-name module listing from a daemon (spec §4.2 step 2)
/// and returns the advertised modules. The connection is expected to be
/// closed by the caller afterwards, since the daemon sends `@RSYNCD: EXIT`
/// and terminates.
pub fn request_module_listing<T: Read + Write>(transport: &mut T) -> Result<Vec<ModuleListing>, CoreError> {
    write_line(transport, format_version_banner().trim_end_matches('\n'))?;
    let peer_banner = read_line(transport)?;
    parse_version_banner(&peer_banner)?;

    write_line(transport, "")?;

    let mut modules = Vec::new();
    loop {
        let line = read_line(transport)?;
        match DaemonStatus::parse(&line) {
            DaemonStatus::Exit => break,
            DaemonStatus::Motd(text) => {
                let (name, comment) = text.split_once('\t').unwrap_or((text.as_str(), ""));
                modules.push(ModuleListing { name: name.to_string(), comment: comment.to_string() });
            }
            DaemonStatus::Error(message) => return Err(CoreError::ServerError(message)),
            DaemonStatus::Ok | DaemonStatus::AuthRequired { .. } => {
                return Err(CoreError::ServerError(
                    "unexpected status line during module listing".to_string(),
                ));
            }
        }
    }
    Ok(modules)
}

/// A module known to the server side of a handshake, used to validate a
/// client's requested module and to look up its authentication secret.
///
/// Authentication is delegated to `secret_resolver`, a closure mapping a
/// submitted username to its expected password: `None` means the module
/// requires no authentication. This crate has no notion of a secrets file
/// itself; that lookup belongs to whatever owns the module's configuration.
pub struct ServerModule<'a> {
    /// The module's name.
    pub name: String,
    /// The module's advertised comment.
    pub comment: String,
    /// Resolves a submitted username to its expected password. `None`
    /// means the module requires no authentication.
    pub secret_resolver: Option<&'a dyn Fn(&str) -> Option<Vec<u8>>>,
}

/// Runs the server side of the handshake, through the checksum seed (spec
/// §4.2). `checksum_seed` is generated by the caller (typically at random)
/// and sent verbatim; recursion support is advertised unconditionally via
/// `CF_INC_RECURSE`.
pub fn perform_server_handshake<T: Read + Write>(
    transport: &mut T,
    modules: &[ServerModule<'_>],
    checksum_seed: u32,
) -> Result<SessionParams, CoreError> {
    write_line(transport, format_version_banner().trim_end_matches('\n'))?;
    let peer_banner = read_line(transport)?;
    let (peer_major, _peer_minor) = parse_version_banner(&peer_banner)?;
    if peer_major < handshake::BANNER_MAJOR {
        write_line(transport, "@RSYNCD: EXIT")?;
        return Err(CoreError::ServerError(format!(
            "client protocol version {peer_major} is older than the minimum supported version {}",
            handshake::BANNER_MAJOR
        )));
    }

    let requested = read_line(transport)?;
    if requested.is_empty() {
        for module in modules {
            write_line(transport, &format!("{}\t{}", module.name, module.comment))?;
        }
        write_line(transport, "@RSYNCD: EXIT")?;
        return Err(CoreError::ModuleNotFound(String::new()));
    }

    let module = modules
        .iter()
        .find(|m| m.name == requested)
        .ok_or_else(|| CoreError::ModuleNotFound(requested.clone()))?;

    if let Some(resolver) = module.secret_resolver {
        let challenge = generate_challenge();
        write_line(
            transport,
            &format!("@RSYNCD: AUTHREQD {}", encode_challenge(&challenge)),
        )?;
        let response = read_line(transport)?;
        let (username, digest) = response
            .split_once(' ')
            .ok_or(CoreError::AuthenticationFailed)?;
        let secret = resolver(username).ok_or(CoreError::AuthenticationFailed)?;
        let expected = compute_auth_digest(&secret, &challenge);
        if digest != expected {
            write_line(transport, "@RSYNCD: ERROR authentication failed")?;
            return Err(CoreError::AuthenticationFailed);
        }
    }

    write_line(transport, "@RSYNCD: OK")?;

    let mut recurse_requested = false;
    loop {
        let line = read_line(transport)?;
        if line.is_empty() {
            break;
        }
        if let Some(rest) = line.strip_prefix('-') {
            if let Some(compat) = rest.split("e.").nth(1) {
                recurse_requested = compat.contains('i');
            }
        }
    }

    let compat_flags = if recurse_requested {
        CompatFlags::empty().with(CompatFlags::INC_RECURSE).with(CompatFlags::SAFE_FLIST)
    } else {
        CompatFlags::empty().with(CompatFlags::SAFE_FLIST)
    };
    transport.write_all(&[compat_flags.bits()]).map_err(rsync_io::IoError::from)?;
    transport.write_all(&checksum_seed.to_le_bytes()).map_err(rsync_io::IoError::from)?;
    transport.flush().map_err(rsync_io::IoError::from)?;

    Ok(SessionParams { compat_flags, checksum_seed })
}

/// Generates a checksum seed suitable for [`perform_server_handshake`]
/// (spec §4.2 step 8): 4 random bytes interpreted as a little-endian `u32`.
#[must_use]
pub fn generate_checksum_seed() -> u32 {
    let mut bytes = [0u8; 4];
    rand::rng().fill_bytes(&mut bytes);
    u32::from_le_bytes(bytes)
}
