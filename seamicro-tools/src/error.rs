//! Error types for seamicro-tools.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for seamicro-tools operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Shell channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session driver errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Tech support bundle errors
    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),
}

impl Error {
    /// Whether the operation stopped because the run was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Channel(ChannelError::Cancelled))
    }

    /// Whether the device rejected the supplied credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::AuthenticationFailed { .. })
        )
    }
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Host is missing from known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Connecting took longer than the configured timeout
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (shell I/O, prompt matching).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// The marker did not show up before the read deadline
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// The remote side closed the stream
    #[error("Channel closed")]
    Closed,

    /// The run was cancelled while waiting on the channel
    #[error("Interrupted")]
    Cancelled,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// I/O error on a stream-backed channel
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Driver layer errors (session lifecycle, privilege elevation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// The session is not open (never opened or already closed)
    #[error("Session not connected")]
    NotConnected,

    /// The operation is not valid in the session's current state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    /// Invalid run configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Tech support bundle errors.
#[derive(Error, Debug)]
pub enum BundleError {
    /// Writing a bundle file failed
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias using seamicro-tools' Error.
pub type Result<T> = std::result::Result<T, Error>;
