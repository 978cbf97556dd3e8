//! Signal handling for in-flight calls.
//!
//! [`Shutdown`] spawns a task that waits for SIGTERM or SIGINT (Ctrl-C on
//! other platforms) and then cancels a [`CancellationToken`]. The token is
//! handed to the [`CallContext`](linepay::CallContext) of the running call,
//! which then ends with a cancellation error instead of being killed mid-way.

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Cancels a token when the process is asked to stop.
#[allow(missing_debug_implementations)] // TaskTracker doesn't impl Debug
pub struct Shutdown {
    task_tracker: TaskTracker,
    token: CancellationToken,
}

impl Shutdown {
    /// Installs the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if signal registration fails.
    #[allow(clippy::unnecessary_wraps)] // Result needed on Unix for signal registration
    pub fn try_new() -> Result<Self, std::io::Error> {
        let token = CancellationToken::new();
        let inner = token.clone();
        let task_tracker = TaskTracker::new();

        #[cfg(unix)]
        {
            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;
            task_tracker.spawn(async move {
                tokio::select! {
                    _ = sigterm.recv() => tracing::info!("Received SIGTERM, cancelling"),
                    _ = sigint.recv() => tracing::info!("Received Ctrl-C, cancelling"),
                    () = inner.cancelled() => return,
                }
                inner.cancel();
            });
        }

        #[cfg(not(unix))]
        {
            task_tracker.spawn(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("Received Ctrl-C, cancelling"),
                    () = inner.cancelled() => return,
                }
                inner.cancel();
            });
        }

        task_tracker.close();
        Ok(Self {
            task_tracker,
            token,
        })
    }

    /// Returns a clone of the token cancelled on shutdown.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stops listening and waits for the handler task to finish.
    pub async fn close(self) {
        self.token.cancel();
        self.task_tracker.wait().await;
    }
}
