//! Channel layer for prompt-bounded shell I/O.
//!
//! This module handles the interactive session stream: sending raw command
//! text and reading output until a literal prompt marker shows up.

mod buffer;
mod io;
mod pty;

pub use buffer::PatternBuffer;
pub use io::{AsyncShell, ShellIo};
pub use pty::{PtyChannel, PtyConfig};
