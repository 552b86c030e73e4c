//! Run options: the typed configuration for one invocation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::error::{DriverError, Result};

/// Default login user.
pub const DEFAULT_USER: &str = "admin";

/// Default chassis hostname alias.
pub const DEFAULT_HOSTNAME: &str = "seamicro";

/// Everything needed to log into a chassis and perform an action.
#[derive(Debug)]
pub struct RunOptions {
    /// Chassis administration host.
    pub host: String,

    /// SSH port.
    pub port: u16,

    /// Login user.
    pub username: String,

    /// Login password.
    pub password: SecretString,

    /// Internal chassis hostname, used to build the expected prompts.
    pub hostname: String,

    /// What to do once elevated. `None` only logs in and elevates.
    pub action: Option<Action>,

    /// Connect/handshake timeout.
    pub connect_timeout: Duration,

    /// Upper bound on each prompt wait. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,

    /// known_hosts file to consult and learn into.
    pub known_hosts_path: Option<PathBuf>,
}

impl RunOptions {
    /// Options with defaults for everything but host and password.
    pub fn new(host: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: DEFAULT_USER.to_string(),
            password,
            hostname: DEFAULT_HOSTNAME.to_string(),
            action: None,
            connect_timeout: Duration::from_secs(30),
            read_timeout: None,
            known_hosts_path: None,
        }
    }

    /// Check the options once, before anything touches the network.
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() || self.host.contains(char::is_whitespace) {
            return Err(invalid(format!("invalid host {:?}", self.host)));
        }
        if self.username.is_empty() {
            return Err(invalid("username must not be empty"));
        }
        if self.hostname.is_empty() || self.hostname.contains(char::is_whitespace) {
            return Err(invalid(format!("invalid hostname {:?}", self.hostname)));
        }
        if let Some(Action::TechSupportBundle(bundle)) = &self.action {
            bundle.validate()?;
        }
        Ok(())
    }
}

/// Action to run against an elevated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Capture diagnostic command output into files.
    TechSupportBundle(BundleOptions),
}

/// Parameters for the tech support bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOptions {
    /// Existing support case number, appended to each filename.
    pub case: Option<String>,

    /// Directory for the files. Defaults to the current directory.
    pub destination: Option<PathBuf>,

    /// Include the extended chassis and storage commands.
    pub extended: bool,
}

impl BundleOptions {
    /// Output directory, falling back to the current directory.
    pub fn output_dir(&self) -> &Path {
        self.destination.as_deref().unwrap_or(Path::new("."))
    }

    /// Case id, with an empty string treated as absent.
    pub fn case(&self) -> Option<&str> {
        self.case.as_deref().filter(|c| !c.is_empty())
    }

    fn validate(&self) -> Result<()> {
        if let Some(case) = self.case() {
            if case == "." || case == ".." || case.contains(['/', '\\']) {
                return Err(invalid(format!("invalid case id {case:?}")));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> crate::Error {
    DriverError::InvalidConfig {
        message: message.into(),
    }
    .into()
}
