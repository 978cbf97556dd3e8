//! Error types for request building and dispatch.
//!
//! Every failure is returned to the immediate caller. The variant tells how
//! far the call got:
//!
//! - [`Error::Validation`], [`Error::Encoding`]: never reached the network
//! - [`Error::Cancelled`]: the [`CallContext`](crate::CallContext) fired
//! - [`Error::Transport`]: reached the network but failed
//! - [`Error::Decode`]: got a response, but the body didn't parse

use std::borrow::Cow;
use std::fmt;
use std::io;

use crate::context::CancelReason;
use crate::dispatch::RawResponse;
use crate::request::Method;

/// Boxed error produced by a [`Transport`](crate::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the client core and the endpoint wrappers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid client configuration (missing identity or secret, malformed base URL).
    #[error("invalid client configuration: {reason}")]
    Validation {
        /// Human-readable description of the problem.
        reason: Cow<'static, str>,
    },

    /// The request path, query, or body could not be encoded.
    #[error("failed to encode request: {0}")]
    Encoding(#[from] EncodingError),

    /// Network or transport failure unrelated to cancellation.
    #[error("transport error: {source}")]
    Transport {
        /// The underlying transport error.
        #[source]
        source: BoxError,
        /// Response metadata, when the failure happened while reading a received body.
        raw: Option<Box<RawResponse>>,
    },

    /// The call context was cancelled or its deadline expired.
    #[error("{0}")]
    Cancelled(CancelReason),

    /// The response body could not be delivered into the requested target.
    #[error("failed to decode response (HTTP {status}): {source}", status = .raw.status)]
    Decode {
        /// Why decoding failed.
        #[source]
        source: DecodeError,
        /// Metadata of the response whose body failed to decode.
        raw: Box<RawResponse>,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Validation`].
    Validation,
    /// See [`Error::Encoding`].
    Encoding,
    /// See [`Error::Transport`].
    Transport,
    /// See [`Error::Cancelled`].
    Cancelled,
    /// See [`Error::Decode`].
    Decode,
}

impl Error {
    pub(crate) fn validation(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Encoding(_) => ErrorKind::Encoding,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Returns the raw response attached to this error, if one was received.
    #[must_use]
    pub fn raw_response(&self) -> Option<&RawResponse> {
        match self {
            Self::Transport { raw, .. } => raw.as_deref(),
            Self::Decode { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Returns `true` if the call was cancelled or timed out.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Failures while turning an operation into an outbound request.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The path is not a valid reference below the endpoint base.
    #[error("invalid request path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The body could not be serialized as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload kind cannot be sent with this method.
    #[error("{payload} payload cannot be sent with {method}")]
    PayloadMismatch {
        /// The request method.
        method: Method,
        /// The payload kind that was supplied.
        payload: PayloadKind,
    },
}

/// The kind of payload attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// URL query parameters.
    Query,
    /// JSON request body.
    Json,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => f.write_str("query"),
            Self::Json => f.write_str("JSON"),
        }
    }
}

/// Failures while delivering a response body into its target.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not valid JSON for the target shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the body into the caller's sink failed.
    #[error("sink error: {0}")]
    Sink(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(
            Error::Cancelled(CancelReason::DeadlineExceeded).kind(),
            ErrorKind::Cancelled
        );
        let err: Error = EncodingError::InvalidPath {
            path: "//x".into(),
            reason: "network-path reference",
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.raw_response().is_none());
    }

    #[test]
    fn test_payload_mismatch_message() {
        let err = EncodingError::PayloadMismatch {
            method: Method::Post,
            payload: PayloadKind::Query,
        };
        assert_eq!(err.to_string(), "query payload cannot be sent with POST");
    }
}
