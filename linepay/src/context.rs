//! Per-call cancellation and deadlines.
//!
//! A [`CallContext`] is passed to every dispatch. It combines a
//! [`CancellationToken`] with an optional deadline; whichever fires first
//! ends the call with [`Error::Cancelled`](crate::Error::Cancelled).
//!
//! ```
//! use std::time::Duration;
//! use linepay::CallContext;
//! use tokio_util::sync::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let ctx = CallContext::with_token(token.clone()).timeout(Duration::from_secs(10));
//! assert!(ctx.error().is_none());
//! token.cancel();
//! assert!(ctx.error().is_some());
//! ```

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a call context ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The cancellation token was triggered.
    Cancelled,
    /// The deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("request cancelled"),
            Self::DeadlineExceeded => f.write_str("request deadline exceeded"),
        }
    }
}

/// Cancellation token plus optional deadline for a single call.
///
/// Cloning is cheap; clones share the token.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that never fires on its own.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token.
    #[must_use]
    pub const fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Sets an absolute deadline. An earlier existing deadline is kept.
    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Sets a deadline `timeout` from now.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    /// Returns the token backing this context.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline_at(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns why the context has ended, or `None` while it is still live.
    ///
    /// Cancellation is reported before an expired deadline.
    #[must_use]
    pub fn error(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes when the context ends.
    pub async fn done(&self) -> CancelReason {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => CancelReason::Cancelled,
                    () = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                CancelReason::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_context_is_live() {
        assert!(CallContext::new().error().is_none());
    }

    #[test]
    fn test_cancelled_token_reports_cancelled() {
        let token = CancellationToken::new();
        let ctx = CallContext::with_token(token.clone());
        token.cancel();
        assert_eq!(ctx.error(), Some(CancelReason::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = CallContext::new().timeout(Duration::from_secs(5));
        assert!(ctx.error().is_none());
        assert_eq!(ctx.done().await, CancelReason::DeadlineExceeded);
        assert_eq!(ctx.error(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_wins_over_expired_deadline() {
        let ctx = CallContext::new().timeout(Duration::from_millis(1));
        tokio::time::advance(Duration::from_millis(5)).await;
        ctx.token().cancel();
        assert_eq!(ctx.error(), Some(CancelReason::Cancelled));
        assert_eq!(ctx.done().await, CancelReason::Cancelled);
    }

    #[test]
    fn test_earlier_deadline_is_kept() {
        let now = Instant::now();
        let ctx = CallContext::new()
            .deadline(now + Duration::from_secs(1))
            .deadline(now + Duration::from_secs(60));
        assert_eq!(ctx.deadline_at(), Some(now + Duration::from_secs(1)));
    }
}
