//! Errors raised while loading daemon configuration or serving a connection.

/// Errors produced by [`crate::config`], [`crate::secrets`], and
/// [`crate::server`].
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// The configuration file could not be read or contained a malformed
    /// line.
    #[error("configuration error: {0}")]
    Config(String),
    /// The secrets file could not be read or contained a malformed line.
    #[error("secrets error: {0}")]
    Secrets(String),
    /// Session handshake sequencing failed.
    #[error(transparent)]
    Session(#[from] rsync_core::CoreError),
    /// Accepting or operating on a connection failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
