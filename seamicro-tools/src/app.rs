//! Top-level run: log in, elevate, perform the action, close.

use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::bundle::TechSupportBundle;
use crate::channel::ShellIo;
use crate::driver::SessionDriver;
use crate::error::Result;
use crate::options::{Action, RunOptions};

/// Run one invocation against the chassis described by `options`.
///
/// Once a session is open it is closed on every exit path, including
/// cancellation through `cancel`. Only errors raised while connecting and
/// logging in are returned as [`Error::Transport`](crate::Error::Transport).
pub async fn run(options: &RunOptions, cancel: CancellationToken) -> Result<()> {
    options.validate()?;

    info!("Logging into {} as {}", options.host, options.username);
    let mut session = SessionDriver::authenticate(options, cancel).await?;

    let outcome = drive(&mut session, options.action.as_ref()).await;
    let closed = session.close().await;
    finish(outcome, closed)
}

/// The run's result once the session has been closed.
///
/// A failed disconnect does not undo completed work.
fn finish(outcome: Result<()>, closed: Result<()>) -> Result<()> {
    if let Err(e) = closed {
        warn!("Error closing connection: {}", e);
    }
    outcome
}

/// Elevate and perform `action` on an authenticated session.
pub async fn drive<S: ShellIo>(
    session: &mut SessionDriver<S>,
    action: Option<&Action>,
) -> Result<()> {
    session.elevate().await?;

    match action {
        Some(Action::TechSupportBundle(options)) => {
            let report = TechSupportBundle::new(options).run(session).await?;
            info!("Wrote {} files", report.files.len());
        }
        None => {}
    }

    Ok(())
}
