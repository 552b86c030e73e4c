//! Byte-stream seam between the shell channel and whatever carries it.

use std::future::Future;

use bytes::{Bytes, BytesMut};
use log::trace;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ChannelError, Result};

/// Duplex byte stream backing an interactive shell.
pub trait ShellIo: Send {
    /// Write `data` to the remote shell.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Wait for the next chunk of output. `None` means the stream ended.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Signal end of input and release the stream.
    fn shutdown(&mut self) -> impl Future<Output = Result<()>> + Send;
}

impl ShellIo for Channel<Msg> {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.data(data).await.map_err(ChannelError::Ssh)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        loop {
            match self.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    return Ok(Some(Bytes::copy_from_slice(&data)));
                }
                Some(ChannelMsg::ExtendedData { data, .. }) => {
                    return Ok(Some(Bytes::copy_from_slice(&data)));
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => return Ok(None),
                Some(other) => trace!("ignoring channel message: {:?}", other),
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.eof().await.map_err(ChannelError::Ssh)?;
        self.close().await.map_err(ChannelError::Ssh)?;
        Ok(())
    }
}

/// Adapter exposing any tokio `AsyncRead + AsyncWrite` stream as a shell.
#[derive(Debug)]
pub struct AsyncShell<T> {
    inner: T,
}

impl<T> AsyncShell<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T> ShellIo for AsyncShell<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.inner
            .write_all(data)
            .await
            .map_err(ChannelError::Io)?;
        self.inner.flush().await.map_err(ChannelError::Io)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Bytes>> {
        let mut chunk = BytesMut::with_capacity(1024);
        let n = self
            .inner
            .read_buf(&mut chunk)
            .await
            .map_err(ChannelError::Io)?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(chunk.freeze()))
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await.map_err(ChannelError::Io)?;
        Ok(())
    }
}
