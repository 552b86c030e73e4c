//! Session driver for chassis interaction.
//!
//! The driver layer owns the authenticated SSH session and exposes the
//! prompt-synchronized primitives (send, read-until, elevate, close) that
//! actions such as the tech support bundle are built on.

mod builder;
mod privilege;
pub(crate) mod response;
mod session;

pub use builder::DriverBuilder;
pub use privilege::SessionState;
pub use response::Response;
pub use session::{SessionDriver, SshSession};
