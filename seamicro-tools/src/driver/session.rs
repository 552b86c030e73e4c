//! Session driver: one authenticated shell on one chassis.

use std::time::Instant;

use bytes::Bytes;
use log::{debug, info, warn};
use russh::Channel;
use russh::client::Msg;
use tokio_util::sync::CancellationToken;

use super::builder::DriverBuilder;
use super::privilege::SessionState;
use super::response::Response;
use crate::channel::{PtyChannel, PtyConfig, ShellIo};
use crate::error::{DriverError, Result};
use crate::options::RunOptions;
use crate::platform::{PlatformDefinition, PrivilegeLevel, PromptSpec};
use crate::transport::SshTransport;

/// Driver for a single interactive chassis session.
///
/// The driver owns the SSH transport and the shell channel for its whole
/// lifetime and handles:
/// - prompt-bounded reads over the shell stream
/// - privilege elevation (`enable`)
/// - paged command execution
/// - cooperative cancellation through a [`CancellationToken`]
pub struct SessionDriver<S> {
    /// Device CLI conventions.
    platform: PlatformDefinition,

    /// SSH transport (absent for stream-backed sessions and once closed).
    transport: Option<SshTransport>,

    /// Interactive shell channel.
    channel: PtyChannel<S>,

    /// Lifecycle state.
    state: SessionState,

    /// Child of the caller's token; cancelled by the caller or by `close`.
    cancel: CancellationToken,
}

/// Session running over a russh shell channel.
pub type SshSession = SessionDriver<Channel<Msg>>;

impl SessionDriver<Channel<Msg>> {
    /// Connect, log in and open the interactive shell.
    pub async fn authenticate(options: &RunOptions, cancel: CancellationToken) -> Result<Self> {
        DriverBuilder::from_options(options)
            .cancel_token(cancel)
            .connect()
            .await
    }
}

impl<S: ShellIo> SessionDriver<S> {
    /// Wrap an already authenticated shell stream.
    pub fn from_shell(
        shell: S,
        platform: PlatformDefinition,
        config: PtyConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self::new(None, shell, platform, config, cancel)
    }

    pub(crate) fn new(
        transport: Option<SshTransport>,
        shell: S,
        platform: PlatformDefinition,
        config: PtyConfig,
        cancel: CancellationToken,
    ) -> Self {
        let cancel = cancel.child_token();
        Self {
            platform,
            transport,
            channel: PtyChannel::new(shell, config, cancel.clone()),
            state: SessionState::Authenticated,
            cancel,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Prompts expected from the chassis.
    pub fn prompts(&self) -> &PromptSpec {
        &self.platform.prompts
    }

    /// Get a reference to the platform definition.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Whether the session is still usable and has not been cancelled.
    pub fn is_running(&self) -> bool {
        self.state != SessionState::Closed && !self.cancel.is_cancelled()
    }

    /// Enter privileged mode.
    ///
    /// Waits for the unprivileged prompt, sends the escalation command and
    /// waits for the privileged prompt.
    pub async fn elevate(&mut self) -> Result<()> {
        if !self.state.can_transition_to(SessionState::Elevated) {
            return Err(DriverError::InvalidState {
                operation: "elevate",
                state: self.state.as_str(),
            }
            .into());
        }

        info!("Enabling {}", self.platform.prompts.hostname());

        self.read_until_prompt(PrivilegeLevel::Unprivileged).await?;

        let escalate = format!("{}\n", self.platform.escalate_command);
        self.send(&escalate).await?;

        self.read_until_prompt(PrivilegeLevel::Privileged).await?;

        self.state.advance(SessionState::Elevated, "elevate")?;
        info!("Enabled");
        Ok(())
    }

    /// Write `text` to the shell verbatim.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        self.ensure_open()?;
        self.channel.send(text).await
    }

    /// Read until `marker` appears, returning the captured bytes.
    pub async fn read_until(&mut self, marker: &str) -> Result<Bytes> {
        self.ensure_open()?;
        self.channel.read_until(marker).await
    }

    /// Read until the prompt for `level` appears.
    pub async fn read_until_prompt(&mut self, level: PrivilegeLevel) -> Result<Bytes> {
        let prompt = self.platform.prompts.for_level(level).to_string();
        self.read_until(&prompt).await
    }

    /// Run a command in privileged mode with paging disabled.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        if self.state != SessionState::Elevated {
            return Err(DriverError::InvalidState {
                operation: "send a command",
                state: self.state.as_str(),
            }
            .into());
        }

        let start = Instant::now();
        let line = self.platform.command_line(command);
        self.send(&line).await?;
        let raw = self.read_until_prompt(PrivilegeLevel::Privileged).await?;

        debug!("{:?} returned {} bytes", command, raw.len());
        Ok(Response::new(
            command,
            raw,
            self.platform.prompts.privileged(),
            start.elapsed(),
        ))
    }

    /// Close the session.
    ///
    /// Cancels any in-flight read and releases the channel and transport.
    /// Calling it again is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        self.state.advance(SessionState::Closed, "close")?;
        self.cancel.cancel();

        let channel_result = self.channel.close().await;
        if let Err(ref e) = channel_result {
            warn!("Failed to close shell channel: {}", e);
        }

        let transport_result = match self.transport.take() {
            Some(transport) => transport.close().await,
            None => Ok(()),
        };

        info!("Connection closed");
        channel_result.and(transport_result)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == SessionState::Closed || !self.channel.is_open() {
            return Err(DriverError::NotConnected.into());
        }
        Ok(())
    }
}

impl<S> Drop for SessionDriver<S> {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            warn!("SessionDriver dropped without close()");
        }
    }
}
