//! Response type for command execution results.

use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;

/// Output captured for one command.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed (without pager suffix).
    pub command: String,

    /// Raw captured bytes: command echo, output and the trailing prompt.
    pub raw_result: Bytes,

    /// The prompt that ended the capture.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,
}

impl Response {
    /// Create a new response.
    pub fn new(
        command: impl Into<String>,
        raw_result: Bytes,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            raw_result,
            prompt: prompt.into(),
            elapsed,
        }
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.raw_result.is_empty()
    }

    /// The capture as text. Invalid UTF-8 is replaced, so use
    /// [`raw_result`](Self::raw_result) when the exact bytes matter.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw_result)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}
