#![deny(missing_docs)]

//! Module configuration, secrets lookup, and connection acceptance for
//! rsync daemon mode (spec §4.2).
//!
//! # Overview
//!
//! [`config::DaemonConfig`] parses the classic `[module]` INI-style
//! configuration format into a list of [`config::ModuleConfig`]s.
//! [`secrets::lookup_password`] resolves a username against a
//! `user:password` secrets file. [`server::serve_connection`] runs the
//! server-side handshake ([`rsync_core::session::perform_server_handshake`])
//! against one accepted connection, binding each configured module's
//! authentication requirement to a secrets-file lookup; [`server::run`]
//! wraps that in a blocking accept loop, one OS thread per connection.
//!
//! # Design
//!
//! This crate stops at the negotiated [`rsync_core::session::SessionParams`]:
//! assembling the file-list, generator, and transfer exchange that follows
//! the handshake is left to whatever drives the full session, the same way
//! the `engine` crate stops short of owning that loop on the generator side.
//!
//! # Errors
//!
//! [`error::DaemonError`] wraps configuration parse failures, secrets-file
//! lookup failures, handshake failures, and I/O errors from the listener or
//! an accepted connection.

pub mod config;
pub mod error;
pub mod secrets;
pub mod server;

pub use config::{DaemonConfig, ModuleConfig};
pub use error::DaemonError;
pub use secrets::lookup_password;
pub use server::{connect_and_handshake, run, serve_connection};
