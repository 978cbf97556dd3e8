//! CLI error type.

use std::io;

/// Everything that can make a CLI invocation fail.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The LINE Pay call failed.
    #[error(transparent)]
    Api(#[from] linepay::Error),

    /// The HTTP client could not be created.
    #[error("failed to set up HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] io::Error),

    /// Writing to stdout failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    /// The response could not be printed as JSON.
    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}
