#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client for the LINE Pay API.
//!
//! Every call goes through two steps: [`Client::new_request`] turns a method,
//! a path and a payload into a [`SignedRequest`], and [`Client::send`]
//! executes it under a [`CallContext`] and decodes the JSON response. The
//! typed wrappers in [`api`] do both for each remote operation.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use linepay::api::payments::AmountRequest;
//! use linepay::{CallContext, Client};
//!
//! # async fn run() -> Result<(), linepay::Error> {
//! let client = Client::builder("channel-id", "channel-secret")
//!     .with_sandbox()
//!     .build()?;
//! let ctx = CallContext::new().timeout(Duration::from_secs(20));
//! let response = client
//!     .confirm_payment(&ctx, 2019049910005496810, &AmountRequest::new(100, "JPY"))
//!     .await?;
//! println!("{}: {}", response.data.return_code, response.data.return_message);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`client`] - Client configuration and builder
//! - [`config`] - Configuration from environment variables
//! - [`request`] - Signed request construction
//! - [`dispatch`] - Request execution and response decoding
//! - [`signature`] - Canonical message and HMAC-SHA256 signing
//! - [`query`] - Query-string serialization
//! - [`context`] - Per-call cancellation and deadlines
//! - [`transport`] - Pluggable HTTP execution
//! - [`api`] - Typed endpoint wrappers
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation of every dispatch

pub mod api;
pub mod client;
pub mod config;
pub mod constants;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod query;
pub mod request;
pub mod signature;
pub mod transport;

pub use api::Envelope;
pub use client::{AuthScheme, Client, ClientBuilder};
pub use config::ClientConfig;
pub use context::{CallContext, CancelReason};
pub use dispatch::{ApiResponse, RawResponse};
pub use error::{BoxError, DecodeError, EncodingError, Error, ErrorKind};
pub use request::{Method, Payload, SignedRequest};
pub use transport::{BoxFuture, Transport};
