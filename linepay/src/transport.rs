//! Pluggable HTTP execution.
//!
//! The [`Client`](crate::Client) hands every signed request to a
//! [`Transport`]. [`reqwest::Client`] is the default implementation; tests and
//! applications with their own middleware implement the trait directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::BoxError;

/// A boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes fully-formed HTTP requests.
///
/// Implementations must not retry. The dispatcher drops the returned future
/// when the call context fires, so implementations should be cancel-safe.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response head with a streaming body.
    fn execute(&self, request: reqwest::Request)
    -> BoxFuture<'_, Result<reqwest::Response, BoxError>>;
}

impl Transport for reqwest::Client {
    fn execute(
        &self,
        request: reqwest::Request,
    ) -> BoxFuture<'_, Result<reqwest::Response, BoxError>> {
        Box::pin(async move {
            Self::execute(self, request)
                .await
                .map_err(BoxError::from)
        })
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(
        &self,
        request: reqwest::Request,
    ) -> BoxFuture<'_, Result<reqwest::Response, BoxError>> {
        (**self).execute(request)
    }
}
