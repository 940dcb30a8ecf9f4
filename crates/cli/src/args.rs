//! The user-facing command-line surface, built with `clap`'s derive API
//! (distinct from [`rsync_core::args`]'s wire-argument grammar, which parses
//! the `--server ...` list this binary sends to its peer, not what a user
//! types).

use std::path::PathBuf;

use clap::Parser;

/// Command-line options accepted by the `rrsync` binary.
#[derive(Debug, Parser)]
#[command(name = "rrsync", about = "Pure-Rust rsync protocol 30 client and daemon")]
pub struct Cli {
    /// Increase verbosity; may be repeated.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Recurse into directories.
    #[arg(short = 'r', long = "recursive")]
    pub recursive: bool,

    /// Delete extraneous files from the receiving side.
    #[arg(long = "delete")]
    pub delete: bool,

    /// Run as a daemon, serving the modules in `--config`.
    #[arg(long = "daemon")]
    pub daemon: bool,

    /// Path to a daemon configuration file (required with `--daemon`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Port to bind (daemon mode) or connect to (client mode).
    #[arg(long = "port", default_value_t = crate::target::DEFAULT_PORT)]
    pub port: u16,

    /// Source path or remote target (`host::module/path`).
    pub source: Option<String>,

    /// Destination path or remote target (`host::module/path`).
    pub destination: Option<String>,
}

impl Cli {
    /// Renders this invocation's verbosity as the `-v` letter run used in
    /// the wire argument list (spec §4.2 step 5).
    #[must_use]
    pub fn verbosity_letters(&self) -> String {
        "v".repeat(self.verbose as usize)
    }
}
