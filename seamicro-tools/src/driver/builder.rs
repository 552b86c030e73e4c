//! Builder for opening chassis sessions.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use russh::Channel;
use russh::client::Msg;
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;

use super::session::SessionDriver;
use crate::channel::PtyConfig;
use crate::error::{ChannelError, DriverError, Result};
use crate::options::{DEFAULT_HOSTNAME, DEFAULT_USER, RunOptions};
use crate::platform::vendors::seamicro;
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig, SshTransport};

/// Builder for connecting a [`SessionDriver`] to a chassis.
///
/// # Example
///
/// ```rust,no_run
/// use secrecy::SecretString;
/// use seamicro_tools::driver::DriverBuilder;
///
/// # async fn example() -> Result<(), seamicro_tools::Error> {
/// let mut session = DriverBuilder::new("10.0.0.1")
///     .username("admin")
///     .password(SecretString::from("secret".to_string()))
///     .hostname("seamicro")
///     .connect()
///     .await?;
/// session.elevate().await?;
/// session.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: String,
    password: Option<SecretString>,
    hostname: String,
    timeout: Duration,
    read_timeout: Option<Duration>,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    cancel: Option<CancellationToken>,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: DEFAULT_USER.to_string(),
            password: None,
            hostname: DEFAULT_HOSTNAME.to_string(),
            timeout: Duration::from_secs(30),
            read_timeout: None,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            cancel: None,
        }
    }

    /// Create a builder carrying the connection settings of `options`.
    pub fn from_options(options: &RunOptions) -> Self {
        let mut builder = Self::new(options.host.clone())
            .port(options.port)
            .username(options.username.clone())
            .password(SecretString::from(
                options.password.expose_secret().to_string(),
            ))
            .hostname(options.hostname.clone())
            .timeout(options.connect_timeout)
            .read_timeout(options.read_timeout);
        if let Some(ref path) = options.known_hosts_path {
            builder = builder.known_hosts_path(path.clone());
        }
        builder
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username (default: `admin`).
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Set the login password.
    pub fn password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    /// Set the chassis hostname alias used for prompts (default: `seamicro`).
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Set the connection timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound every prompt wait. `None` waits indefinitely.
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file instead of the user's default.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Token that aborts connecting and every later read.
    pub fn cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Connect, authenticate and open the interactive shell.
    pub async fn connect(self) -> Result<SessionDriver<Channel<Msg>>> {
        let password = self.password.ok_or_else(|| DriverError::InvalidConfig {
            message: "Password is required".to_string(),
        })?;

        let platform = seamicro::platform(&self.hostname);
        let cancel = self.cancel.unwrap_or_default();

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username: self.username,
            auth: AuthMethod::Password(password),
            timeout: self.timeout,
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        let transport = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChannelError::Cancelled.into()),
            transport = SshTransport::connect(ssh_config) => transport?,
        };

        let shell = match transport.open_shell().await {
            Ok(shell) => shell,
            Err(e) => {
                if let Err(close_err) = transport.close().await {
                    warn!("Failed to disconnect after shell error: {}", close_err);
                }
                return Err(e);
            }
        };

        let config = PtyConfig {
            read_timeout: self.read_timeout,
        };
        Ok(SessionDriver::new(
            Some(transport),
            shell,
            platform,
            config,
            cancel,
        ))
    }
}
