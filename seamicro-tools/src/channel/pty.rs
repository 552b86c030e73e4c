//! PTY channel abstraction for interactive sessions.

use std::time::Duration;

use bytes::Bytes;
use log::{debug, trace};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::buffer::PatternBuffer;
use super::io::ShellIo;
use crate::error::{ChannelError, Result};

/// Configuration for PTY channel behavior.
#[derive(Debug, Clone, Default)]
pub struct PtyConfig {
    /// Upper bound on a single `read_until`. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
}

/// High-level PTY channel for interactive device sessions.
///
/// This wraps the shell stream and provides marker-bounded reads that can
/// be interrupted through a [`CancellationToken`].
pub struct PtyChannel<S> {
    /// The underlying shell stream (`None` once closed).
    io: Option<S>,

    /// Configuration for this channel.
    config: PtyConfig,

    /// Output received but not yet handed to a caller.
    buffer: PatternBuffer,

    /// Cancels any in-flight read.
    cancel: CancellationToken,
}

impl<S: ShellIo> PtyChannel<S> {
    /// Create a new PTY channel over an open shell stream.
    pub fn new(io: S, config: PtyConfig, cancel: CancellationToken) -> Self {
        Self {
            io: Some(io),
            config,
            buffer: PatternBuffer::new(),
            cancel,
        }
    }

    /// Check if the channel is open.
    pub fn is_open(&self) -> bool {
        self.io.is_some()
    }

    /// Get a reference to the buffered, unconsumed output.
    pub fn buffer(&self) -> &PatternBuffer {
        &self.buffer
    }

    /// Write `text` to the shell verbatim. No newline is appended.
    pub async fn send(&mut self, text: &str) -> Result<()> {
        let io = self.io.as_mut().ok_or(ChannelError::Closed)?;
        trace!("send: {:?}", text);
        io.send(text.as_bytes()).await
    }

    /// Read until `marker` appears in the output.
    ///
    /// Returns the raw bytes received since the previous `read_until` up to
    /// and including the marker. Output following the marker stays buffered
    /// for the next call.
    pub async fn read_until(&mut self, marker: &str) -> Result<Bytes> {
        let deadline = self.config.read_timeout.map(|t| Instant::now() + t);
        self.buffer.rewind();

        loop {
            if let Some(end) = self.buffer.find(marker.as_bytes()) {
                let data = self.buffer.split_through(end);
                debug!("matched {:?} after {} bytes", marker, data.len());
                return Ok(data);
            }

            if self.cancel.is_cancelled() {
                return Err(ChannelError::Cancelled.into());
            }

            match self.read_chunk(deadline).await? {
                Some(chunk) => {
                    trace!("read {} bytes", chunk.len());
                    self.buffer.extend(&chunk);
                }
                None => return Err(ChannelError::Closed.into()),
            }
        }
    }

    /// Wait for the next chunk, racing cancellation and the deadline.
    async fn read_chunk(&mut self, deadline: Option<Instant>) -> Result<Option<Bytes>> {
        let timeout = self.config.read_timeout.unwrap_or_default();
        let cancel = &self.cancel;
        let io = self.io.as_mut().ok_or(ChannelError::Closed)?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ChannelError::Cancelled.into()),
            result = Self::recv_before(io, deadline, timeout) => result,
        }
    }

    async fn recv_before(
        io: &mut S,
        deadline: Option<Instant>,
        timeout: Duration,
    ) -> Result<Option<Bytes>> {
        match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, io.recv()).await {
                Ok(result) => result,
                Err(_) => Err(ChannelError::PatternTimeout(timeout).into()),
            },
            None => io.recv().await,
        }
    }

    /// Shut the stream down. Later calls are no-ops.
    pub async fn close(&mut self) -> Result<()> {
        match self.io.take() {
            Some(mut io) => {
                self.buffer.clear();
                io.shutdown().await
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::AsyncShell;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

    type TestChannel = PtyChannel<AsyncShell<DuplexStream>>;

    fn channel(config: PtyConfig) -> (TestChannel, DuplexStream, CancellationToken) {
        let (local, remote) = tokio::io::duplex(4096);
        let cancel = CancellationToken::new();
        let channel = PtyChannel::new(AsyncShell::new(local), config, cancel.clone());
        (channel, remote, cancel)
    }

    #[tokio::test]
    async fn test_read_until_includes_marker() {
        let (mut channel, mut remote, _cancel) = channel(PtyConfig::default());
        remote.write_all(b"Welcome\r\nseamicro>").await.unwrap();

        let text = channel.read_until("seamicro>").await.unwrap();
        assert_eq!(text, "Welcome\r\nseamicro>");
    }

    #[tokio::test]
    async fn test_read_until_waits_for_full_marker() {
        let (mut channel, mut remote, _cancel) = channel(PtyConfig::default());

        let device = tokio::spawn(async move {
            remote.write_all(b"line one\r\nseami").await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.write_all(b"cro#").await.unwrap();
            remote
        });

        let text = channel.read_until("seamicro#").await.unwrap();
        assert_eq!(text, "line one\r\nseamicro#");
        device.await.unwrap();
    }

    #[tokio::test]
    async fn test_remainder_kept_for_next_read() {
        let (mut channel, mut remote, _cancel) = channel(PtyConfig::default());
        remote
            .write_all(b"seamicro>enable\r\nseamicro#")
            .await
            .unwrap();

        assert_eq!(channel.read_until("seamicro>").await.unwrap(), "seamicro>");
        assert_eq!(
            channel.read_until("seamicro#").await.unwrap(),
            "enable\r\nseamicro#"
        );
        assert!(channel.buffer().is_empty());
    }

    #[tokio::test]
    async fn test_read_until_keeps_raw_bytes() {
        let (mut channel, mut remote, _cancel) = channel(PtyConfig::default());
        remote.write_all(b"caf\xe9 \xff\r\nseamicro#").await.unwrap();

        let data = channel.read_until("seamicro#").await.unwrap();
        assert_eq!(&data[..], b"caf\xe9 \xff\r\nseamicro#");
    }

    #[tokio::test]
    async fn test_send_is_verbatim() {
        let (mut channel, mut remote, _cancel) = channel(PtyConfig::default());
        channel.send("enable").await.unwrap();
        channel.send("\n").await.unwrap();

        let mut sent = vec![0u8; 7];
        remote.read_exact(&mut sent).await.unwrap();
        assert_eq!(&sent, b"enable\n");
    }

    #[tokio::test]
    async fn test_cancel_interrupts_read() {
        let (mut channel, mut remote, cancel) = channel(PtyConfig::default());
        remote.write_all(b"partial output").await.unwrap();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancel.cancel();
        });

        let err = channel.read_until("seamicro#").await.unwrap_err();
        assert!(err.is_cancelled());
        drop(remote);
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let config = PtyConfig {
            read_timeout: Some(Duration::from_millis(20)),
        };
        let (mut channel, _remote, _cancel) = channel(config);

        let err = channel.read_until("seamicro#").await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Channel(ChannelError::PatternTimeout(_))
        ));
    }

    #[tokio::test]
    async fn test_eof_reports_closed() {
        let (mut channel, remote, _cancel) = channel(PtyConfig::default());
        drop(remote);

        let err = channel.read_until("seamicro#").await.unwrap_err();
        assert!(matches!(err, crate::Error::Channel(ChannelError::Closed)));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (mut channel, _remote, _cancel) = channel(PtyConfig::default());
        channel.close().await.unwrap();
        assert!(!channel.is_open());
        channel.close().await.unwrap();

        assert!(channel.send("show chassis\n").await.is_err());
    }
}
