//! # seamicro-tools
//!
//! Automation tools for interacting with a Seamicro chassis over SSH.
//!
//! The library drives an interactive chassis shell the way an operator
//! would: log in, `enable`, run `show` commands with paging disabled and
//! capture whatever the chassis prints up to the next prompt.
//!
//! ## Features
//!
//! - Async SSH connections via russh, trust-on-first-use host keys
//! - Prompt-bounded reads over the raw shell stream
//! - Cooperative cancellation of every wait via `CancellationToken`
//! - Tech support bundle generation (one file per diagnostic command)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use secrecy::SecretString;
//! use seamicro_tools::bundle::TechSupportBundle;
//! use seamicro_tools::{BundleOptions, DriverBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), seamicro_tools::Error> {
//!     let mut session = DriverBuilder::new("10.0.0.1")
//!         .username("admin")
//!         .password(SecretString::from("secret".to_string()))
//!         .connect()
//!         .await?;
//!
//!     session.elevate().await?;
//!
//!     let bundle = TechSupportBundle::new(&BundleOptions {
//!         case: Some("CASE123".to_string()),
//!         destination: Some("/tmp/bundle".into()),
//!         extended: false,
//!     });
//!     bundle.run(&mut session).await?;
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod bundle;
pub mod channel;
pub mod driver;
pub mod error;
pub mod options;
pub mod platform;
pub mod transport;

// Re-export main types for convenience
pub use driver::{DriverBuilder, Response, SessionDriver, SessionState, SshSession};
pub use error::Error;
pub use options::{Action, BundleOptions, RunOptions};
pub use platform::{PlatformDefinition, PrivilegeLevel, PromptSpec};
pub use transport::{AuthMethod, HostKeyVerification, SshConfig};
