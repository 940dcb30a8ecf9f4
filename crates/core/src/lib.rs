#![deny(missing_docs)]

//! Session handshake sequencing, argument parsing, and transfer
//! orchestration for the rsync protocol core (spec §4.2, §4.3, §5).
//!
//! # Overview
//!
//! [`session`] sequences the line-oriented daemon handshake, from the
//! `@RSYNCD:` version banner through the checksum seed, for both the client
//! and server roles. [`args`] is the deterministic getopt-style parser the
//! handshake's `--server` argument list (spec §4.2 step 5) is built from and
//! parsed with on the receiving end; it's a general-purpose parser over a
//! configured [`args::OptionSpec`] set, not tied to any particular option
//! table. [`message`] formats itemize-output lines from the flags the
//! generator produces (spec §4.9). [`orchestrator`] is what actually runs a
//! transfer once a session's parameters are settled, driving the Generator,
//! Sender, and Receiver to completion (spec §5).
//!
//! # Design
//!
//! The handshake functions operate on a raw `T: Read + Write` transport for
//! the pre-multiplex phase, since `@RSYNCD:` lines and the argument list are
//! never sent through the envelope framing [`rsync_io::DuplexChannel`]
//! provides. Once [`session::perform_client_handshake`] or
//! [`session::perform_server_handshake`] returns a [`session::SessionParams`],
//! the caller wraps the same transport in a `DuplexChannel` for the
//! multiplexed transfer phase; this crate doesn't do that wrapping itself; it
//! only negotiates what the channel needs to be constructed with.
//! [`orchestrator::run_local_sync`] runs the three roles as threads
//! connected by [`rsync_io::DuplexPipe`] pairs rather than a real socket,
//! since a local sync has no second process to hand the transport to.
//!
//! # Errors
//!
//! [`error::CoreError`] wraps I/O, protocol, generator, transfer, metadata,
//! and file-list failures encountered while sequencing a session or running
//! a transfer, plus the handshake-specific failure modes spec §4.2 names:
//! authentication failure, unknown module, a server error status, and a
//! client requesting recursion the peer didn't negotiate.
//!
//! # Examples
//!
//! See [`session`]'s tests for a full scripted client/server exchange, and
//! [`orchestrator`]'s tests for a full local transfer; this crate disables
//! doctests (see the `doctest = false` note in its `Cargo.toml`) because its
//! name `core` shadows the standard library's `core` module, which breaks
//! `thiserror`'s derive macros when they expand inside a doctest's own
//! anonymous crate.

pub mod args;
pub mod error;
pub mod message;
pub mod orchestrator;
pub mod session;

pub use args::{ArgKind, ArgParser, ArgPolicy, ArgValue, OptionSpec, ParsedArgs};
pub use error::CoreError;
pub use message::{Message, Role};
pub use orchestrator::{Stats, SyncOptions, run_local_sync};
pub use session::{
    ClientOptions, Credentials, ModuleListing, ServerModule, SessionParams,
    generate_checksum_seed, perform_client_handshake, perform_server_handshake,
    request_module_listing,
};
