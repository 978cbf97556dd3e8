//! Command-line client for the LINE Pay API.
//!
//! # Usage
//!
//! ```bash
//! # Request a sandbox payment
//! linepay --sandbox request --order-id order-1 --product-name pen --amount 100 \
//!     --confirm-url https://shop.example/confirm --cancel-url https://shop.example/cancel
//!
//! # Confirm it once the user has approved
//! linepay --sandbox confirm 2019049910005496810 --amount 100
//!
//! # Configure logging level
//! RUST_LOG=linepay=debug linepay --sandbox details --order-id order-1
//! ```
//!
//! # Environment Variables
//!
//! A `.env` file in the current directory is loaded first.
//!
//! - `LINE_PAY_CHANNEL_ID`: channel identity (or `--channel-id`)
//! - `LINE_PAY_CHANNEL_SECRET`: channel secret (or `--channel-secret`)
//! - `LINE_PAY_ENDPOINT_BASE`: endpoint base URL (or `--endpoint-base`)
//! - `LINE_PAY_AUTH_SCHEME`: `signature` or `channel-secret` (or `--auth-scheme`)
//! - `RUST_LOG`: log level filter (default: `info`)

mod cli;
mod error;
mod shutdown;

use clap::Parser;
use linepay::CallContext;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;
use crate::shutdown::Shutdown;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!("linepay failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.connection.config()?;
    tracing::debug!(?config, "Loaded configuration");

    let http = reqwest::Client::builder()
        .user_agent(concat!("linepay-cli/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let client = config.builder().with_transport(http).build()?;
    tracing::info!(
        endpoint = %client.endpoint_base(),
        auth_scheme = %client.auth_scheme(),
        "Client ready"
    );

    let shutdown = Shutdown::try_new().map_err(CliError::Signal)?;
    let ctx = CallContext::with_token(shutdown.token()).timeout(cli.connection.timeout());

    let result = cli.command.run(&client, &ctx).await;
    shutdown.close().await;
    result
}
