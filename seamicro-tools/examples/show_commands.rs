//! Run ad-hoc `show` commands on a chassis and print the raw output.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example show_commands -- 10.0.0.1 --password secret "show chassis" "show version details"
//! ```

use std::time::Duration;

use clap::Parser;
use secrecy::SecretString;
use seamicro_tools::DriverBuilder;

#[derive(Parser, Debug)]
struct Args {
    /// Chassis administration host
    host: String,

    /// Username
    #[arg(short, long, default_value = "admin")]
    user: String,

    /// Password
    #[arg(short, long)]
    password: String,

    /// Internal chassis hostname
    #[arg(long, default_value = "seamicro")]
    hostname: String,

    /// Commands to run in privileged mode
    #[arg(required = true)]
    commands: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=debug for protocol detail
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut session = DriverBuilder::new(&args.host)
        .username(&args.user)
        .password(SecretString::from(args.password))
        .hostname(&args.hostname)
        .read_timeout(Some(Duration::from_secs(120)))
        .connect()
        .await?;

    session.elevate().await?;

    for command in &args.commands {
        println!("{}", "-".repeat(50));
        let response = session.send_command(command).await?;
        println!("{}", response);
        println!("({:?})", response.elapsed);
    }

    session.close().await?;
    Ok(())
}
