//! `seamicro-tools` command line entry point.

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use seamicro_tools::options::{DEFAULT_HOSTNAME, DEFAULT_USER};
use seamicro_tools::{Action, BundleOptions, Error, RunOptions, app};

/// Tools to ease Seamicro Administration
#[derive(Parser, Debug)]
#[command(name = "seamicro-tools", version)]
struct Cli {
    /// The chassis administration host
    host: String,

    /// The username to login with
    #[arg(short = 'u', long = "user", default_value = DEFAULT_USER)]
    user: String,

    /// The password to use when authenticating. If blank you will be
    /// prompted for the password
    #[arg(short = 'p', long)]
    password: Option<String>,

    /// The internal seamicro chassis hostname
    #[arg(long, default_value = DEFAULT_HOSTNAME)]
    hostname: String,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    port: u16,

    /// Connection timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Give up waiting for a prompt after this many seconds
    #[arg(long)]
    read_timeout: Option<u64>,

    /// known_hosts file to check and record the chassis key in
    #[arg(long)]
    known_hosts: Option<PathBuf>,

    #[command(subcommand)]
    action: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a tech support bundle
    TechSupportBundle {
        /// The existing support case #
        #[arg(short = 'c', long)]
        case: Option<String>,

        /// The directory to place the files
        #[arg(short = 'd', long)]
        destination: Option<PathBuf>,

        /// Send additional, more in-depth logs
        #[arg(short = 'e', long)]
        extended: bool,
    },
}

impl Cli {
    fn into_options(self) -> std::io::Result<RunOptions> {
        let password = match self.password {
            Some(password) if !password.is_empty() => password,
            _ => rpassword::prompt_password("Password: ")?,
        };

        let mut options = RunOptions::new(self.host, SecretString::from(password));
        options.port = self.port;
        options.username = self.user;
        options.hostname = self.hostname;
        options.connect_timeout = Duration::from_secs(self.timeout);
        options.read_timeout = self.read_timeout.map(Duration::from_secs);
        options.known_hosts_path = self.known_hosts;
        options.action = self.action.map(|command| match command {
            Command::TechSupportBundle {
                case,
                destination,
                extended,
            } => Action::TechSupportBundle(BundleOptions {
                case,
                destination,
                extended,
            }),
        });
        Ok(options)
    }
}

fn init_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,russh=error"),
    )
    .format(|buf, record| writeln!(buf, "{}", record.args()))
    .init();
}

/// Cancel `cancel` on the first interrupt.
///
/// Returns `true` once a second interrupt arrives, `false` if the signal
/// source fails.
async fn watch_interrupts<F, Fut>(mut next_interrupt: F, cancel: CancellationToken) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_interrupt().await.is_err() {
        return false;
    }
    cancel.cancel();
    next_interrupt().await.is_ok()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    let options = match Cli::parse().into_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Could not read password: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if watch_interrupts(tokio::signal::ctrl_c, interrupt).await {
            warn!("Interrupted again, exiting");
            std::process::exit(1);
        }
    });

    match app::run(&options, cancel).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_cancelled() => {
            info!("Aborted");
            ExitCode::FAILURE
        }
        Err(e @ Error::Transport(_)) => {
            error!(
                "Error logging into {} as {}: {}",
                options.host, options.username, e
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn test_second_interrupt_requests_exit() {
        let cancel = CancellationToken::new();
        let exit = watch_interrupts(|| async { Ok(()) }, cancel.clone()).await;
        assert!(exit);
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_single_interrupt_only_cancels() {
        let cancel = CancellationToken::new();
        let mut signals = 0;
        let watcher = watch_interrupts(
            || {
                signals += 1;
                let first = signals == 1;
                async move {
                    if first {
                        Ok(())
                    } else {
                        std::future::pending().await
                    }
                }
            },
            cancel.clone(),
        );

        let finished = tokio::time::timeout(std::time::Duration::from_millis(50), watcher).await;
        assert!(finished.is_err());
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_broken_signal_source_does_not_cancel() {
        let cancel = CancellationToken::new();
        let exit = watch_interrupts(
            || async { Err(std::io::Error::other("no signal handler")) },
            cancel.clone(),
        )
        .await;
        assert!(!exit);
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["seamicro-tools", "10.0.0.1", "-p", "pw"]).unwrap();
        assert_eq!(cli.user, "admin");
        assert_eq!(cli.hostname, "seamicro");
        assert!(cli.action.is_none());

        let options = cli.into_options().unwrap();
        assert_eq!(options.host, "10.0.0.1");
        assert!(options.action.is_none());
        assert!(options.read_timeout.is_none());
    }

    #[test]
    fn test_tech_support_bundle_subcommand() {
        let cli = Cli::try_parse_from([
            "seamicro-tools",
            "10.0.0.1",
            "-u",
            "operator",
            "-p",
            "pw",
            "--hostname",
            "sm15k",
            "tech-support-bundle",
            "-c",
            "CASE123",
            "-d",
            "/tmp/bundle",
            "-e",
        ])
        .unwrap();

        let options = cli.into_options().unwrap();
        assert_eq!(options.username, "operator");
        assert_eq!(options.hostname, "sm15k");
        assert_eq!(
            options.action,
            Some(Action::TechSupportBundle(BundleOptions {
                case: Some("CASE123".to_string()),
                destination: Some(PathBuf::from("/tmp/bundle")),
                extended: true,
            }))
        );
    }
}
