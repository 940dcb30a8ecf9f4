#![deny(missing_docs)]

//! A thin command-line entry point over the session core and daemon
//! crates (spec §4.2, §4.3).
//!
//! # Overview
//!
//! [`args::Cli`] is the user-facing flag surface, parsed with `clap`. In
//! daemon mode (`--daemon --config <path>`), [`run`] loads a
//! [`daemon::DaemonConfig`] and hands a bound listener to
//! [`daemon::server::run`]. In client mode, [`target::parse`] picks out
//! whichever of `SOURCE`/`DESTINATION` names a remote module; if one does,
//! [`run`] connects to it and performs the client handshake via
//! [`daemon::server::connect_and_handshake`]. If neither does, both name
//! local paths and [`run`] drives the transfer itself via
//! [`rsync_core::orchestrator::run_local_sync`].
//!
//! # Design
//!
//! Genuine remote-to-remote or local-to-remote transfers stop at the
//! handshake: this binary reports the negotiated
//! [`rsync_core::session::SessionParams`] and exits, leaving the file-list
//! and delta exchange that follows to whatever drives the daemon side of
//! that connection. A local-to-local invocation has no second process to
//! hand that work to, so it runs the full three-role transfer in-process.
//!
//! # Errors
//!
//! [`error::CliError`] wraps argument-parsing failures, malformed remote
//! target specs, and daemon/session failures.

pub mod args;
pub mod error;
pub mod target;

use std::net::TcpListener;
use std::sync::Arc;

use clap::Parser;

pub use args::Cli;
pub use error::CliError;
pub use target::RemoteTarget;

/// Runs the CLI over `argv` (including the program name at index 0, as
/// `std::env::args` provides it), returning the process exit code.
pub fn run<I, S>(argv: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::try_parse_from(argv)?;

    if cli.daemon {
        return run_daemon(&cli);
    }

    run_client(&cli)
}

fn run_daemon(cli: &Cli) -> Result<i32, CliError> {
    let config_path = cli.config.as_ref().ok_or(CliError::MissingDaemonConfig)?;
    let config = Arc::new(daemon::DaemonConfig::load(config_path)?);
    let listener = TcpListener::bind(("0.0.0.0", cli.port)).map_err(daemon::DaemonError::from)?;
    logging::record(logging::Level::Info, format!("listening on port {}", cli.port));
    daemon::run(listener, config)?;
    Ok(0)
}

fn run_client(cli: &Cli) -> Result<i32, CliError> {
    let source = cli.source.as_deref().unwrap_or_default();
    let destination = cli.destination.as_deref().unwrap_or_default();

    let source_target = target::parse(source)?;
    let destination_target = target::parse(destination)?;

    let Some(remote) = source_target.clone().or_else(|| destination_target.clone()) else {
        if source.is_empty() || destination.is_empty() {
            return Err(CliError::NoRemoteTarget);
        }
        return run_local_transfer(source, destination, cli);
    };

    let is_pull = source_target.is_some();
    let options = rsync_core::session::ClientOptions {
        recurse: cli.recursive,
        sender: is_pull,
        verbosity: cli.verbosity_letters(),
        extra_args: Vec::new(),
        paths: vec![remote.path.clone()],
    };

    let (_stream, params) = daemon::connect_and_handshake(&remote.socket_address(), &remote.module, &options)?;
    logging::record(
        logging::Level::Info,
        format!(
            "session established with {} (checksum seed {})",
            remote.socket_address(),
            params.checksum_seed
        ),
    );
    Ok(0)
}

/// Runs a transfer between two local paths in-process (spec §5), used when
/// neither SOURCE nor DESTINATION names a remote module.
fn run_local_transfer(source: &str, destination: &str, cli: &Cli) -> Result<i32, CliError> {
    let options = rsync_core::SyncOptions {
        delete: cli.delete,
        checksum_seed: rsync_core::session::generate_checksum_seed(),
        ignore_times: false,
        preserve_links: true,
    };

    let stats = rsync_core::run_local_sync(std::path::Path::new(source), std::path::Path::new(destination), &options)?;
    logging::record(
        logging::Level::Info,
        format!(
            "transferred {} of {} files ({} bytes written)",
            stats.num_transferred_files, stats.num_files, stats.total_bytes_written
        ),
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;

    #[test]
    fn run_rejects_a_missing_destination_argument() {
        let err = run(["rrsync", "a.txt"]).unwrap_err();
        assert!(matches!(err, CliError::NoRemoteTarget));
    }

    #[test]
    fn run_syncs_two_local_paths_in_process() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(source.path().join("a.txt"), b"local sync payload").unwrap();

        let code = run([
            "rrsync",
            source.path().to_str().unwrap(),
            dest.path().to_str().unwrap(),
        ])
        .unwrap();

        assert_eq!(code, 0);
        assert_eq!(fs::read(dest.path().join("a.txt")).unwrap(), b"local sync payload");
    }

    #[test]
    fn run_rejects_daemon_mode_without_config() {
        let err = run(["rrsync", "--daemon"]).unwrap_err();
        assert!(matches!(err, CliError::MissingDaemonConfig));
    }

    #[test]
    fn run_client_completes_handshake_against_a_scripted_daemon() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let modules = vec![rsync_core::session::ServerModule {
                name: "data".to_string(),
                comment: String::new(),
                secret_resolver: None,
            }];
            rsync_core::session::perform_server_handshake(&mut stream, &modules, 5)
        });

        let destination = format!("127.0.0.1:{port}::data");
        let code = run(["rrsync", "src/", destination.as_str()]).unwrap();
        assert_eq!(code, 0);
        server.join().unwrap().unwrap();
    }
}
