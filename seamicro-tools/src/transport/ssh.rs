//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use russh::Channel;
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::error::{Result, TransportError};

/// SSH transport wrapping a russh client session.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// Configuration used for this connection.
    config: SshConfig,
}

impl SshTransport {
    /// Connect to the SSH server and authenticate.
    pub async fn connect(config: SshConfig) -> Result<Self> {
        let ssh_config = Arc::new(client::Config::default());

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        debug!("connecting to {}", config.socket_addr());

        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            // Prefer the detailed host key error over russh's generic UnknownKey
            match host_key_error.lock().ok().and_then(|mut slot| slot.take()) {
                Some(hk_err) => hk_err,
                None => TransportError::Ssh(e),
            }
        })?;

        Self::authenticate(&mut session, &config).await?;

        Ok(Self { session, config })
    }

    /// Open a session channel with a PTY and an interactive shell.
    pub async fn open_shell(&self) -> Result<Channel<Msg>> {
        let channel = self
            .session
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_pty(
                true,
                "xterm",
                self.config.terminal_width,
                self.config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;

        Ok(channel)
    }

    /// Authenticate with the server.
    async fn authenticate(session: &mut Handle<SshHandler>, config: &SshConfig) -> Result<()> {
        let success = match &config.auth {
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await
                .map_err(TransportError::Ssh)?
                .success(),
        };

        if !success {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        debug!("authenticated as {}", config.username);
        Ok(())
    }

    /// Close the connection.
    pub async fn close(self) -> Result<()> {
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Detailed host-key error surfaced by connect().
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// Check the host key against known_hosts.
    ///
    /// Returns `Ok(true)` if matched, `Ok(false)` if host not found,
    /// `Err(TransportError::HostKeyChanged)` if key changed.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, TransportError> {
        let result = match self.known_hosts_path {
            Some(ref path) => {
                russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
            }
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) -> std::result::Result<(), TransportError> {
        let result = match self.known_hosts_path {
            Some(ref path) => russh::keys::known_hosts::learn_known_hosts_path(
                &self.host, self.port, pubkey, path,
            ),
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey),
        };

        result.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    fn reject(&self, error: TransportError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(error);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.host_key_verification {
            HostKeyVerification::Disabled => Ok(true),

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => {
                    // Trust on first use
                    debug!("learning host key for {}:{}", self.host, self.port);
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key: {}", e);
                    }
                    Ok(true)
                }
                // A missing or unreadable store is not a mismatch
                Err(TransportError::KnownHosts(e)) => {
                    warn!("Could not read known_hosts, accepting key: {}", e);
                    Ok(true)
                }
                Err(e) => Ok(self.reject(e)),
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => Ok(self.reject(TransportError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                })),
                Err(e) => Ok(self.reject(e)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use russh::client::Handler;

    const CHASSIS_KEY: &str = "AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl";
    const OTHER_KEY: &str = "AAAAC3NzaC1lZDI1NTE5AAAAICJZMPYGNq4psmVLguw9BXarfZDV4ka3+keqk7Mg70aJ";

    fn key(base64: &str) -> PublicKey {
        russh::keys::parse_public_key_base64(base64).unwrap()
    }

    fn handler(mode: HostKeyVerification, known_hosts: PathBuf) -> SshHandler {
        SshHandler {
            host: "10.0.0.1".to_string(),
            port: 2222,
            host_key_verification: mode,
            known_hosts_path: Some(known_hosts),
            host_key_error: Arc::new(Mutex::new(None)),
        }
    }

    fn stored_error(handler: &SshHandler) -> Option<TransportError> {
        handler.host_key_error.lock().unwrap().take()
    }

    #[tokio::test]
    async fn test_unknown_key_is_learned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ssh").join("known_hosts");
        let mut handler = handler(HostKeyVerification::AcceptNew, path.clone());

        assert!(handler.check_server_key(&key(CHASSIS_KEY)).await.unwrap());
        assert!(stored_error(&handler).is_none());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[10.0.0.1]:2222"));
        assert!(contents.contains(CHASSIS_KEY));
    }

    #[tokio::test]
    async fn test_known_key_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        let mut handler = handler(HostKeyVerification::AcceptNew, path.clone());

        assert!(handler.check_server_key(&key(CHASSIS_KEY)).await.unwrap());
        let learned = std::fs::read_to_string(&path).unwrap();

        assert!(handler.check_server_key(&key(CHASSIS_KEY)).await.unwrap());
        assert!(stored_error(&handler).is_none());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), learned);
    }

    #[tokio::test]
    async fn test_changed_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        std::fs::write(&path, format!("[10.0.0.1]:2222 ssh-ed25519 {CHASSIS_KEY}\n")).unwrap();
        let mut handler = handler(HostKeyVerification::AcceptNew, path);

        assert!(!handler.check_server_key(&key(OTHER_KEY)).await.unwrap());
        assert!(matches!(
            stored_error(&handler),
            Some(TransportError::HostKeyChanged { port: 2222, line: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_unreadable_store_accepts_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut handler = handler(HostKeyVerification::AcceptNew, dir.path().to_path_buf());

        assert!(handler.check_server_key(&key(CHASSIS_KEY)).await.unwrap());
        assert!(stored_error(&handler).is_none());
    }

    #[tokio::test]
    async fn test_strict_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known_hosts");
        let mut handler = handler(HostKeyVerification::Strict, path.clone());

        assert!(!handler.check_server_key(&key(CHASSIS_KEY)).await.unwrap());
        assert!(matches!(
            stored_error(&handler),
            Some(TransportError::HostKeyUnknown { .. })
        ));
        assert!(!path.exists());
    }
}
