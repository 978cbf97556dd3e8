//! Request dispatch and response decoding.
//!
//! [`Client::send`] decodes the response body as JSON into a caller-chosen
//! type. [`Client::send_to`] streams the raw body into an [`io::Write`]
//! sink instead. Both honor the [`CallContext`] before, during and after the
//! exchange: once the context has ended, the call reports
//! [`Error::Cancelled`] no matter what the transport returned.
//!
//! The HTTP status is not interpreted. A non-2xx response with a JSON body
//! decodes like any other; the status is available on [`RawResponse`].
//!
//! With the `telemetry` feature each call runs inside a `linepay.dispatch`
//! span carrying the method and path. Credentials are never recorded.

use std::fmt::Display;
use std::io;

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span};

use crate::client::Client;
use crate::context::CallContext;
use crate::error::{DecodeError, Error};
use crate::request::SignedRequest;

/// Metadata of a received response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Final URL of the response.
    pub url: Url,
}

impl RawResponse {
    fn from_response(response: &reqwest::Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        }
    }
}

/// A decoded response body together with its metadata.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// The decoded body.
    pub data: T,
    /// Status, headers and URL of the response.
    pub raw: RawResponse,
}

impl<T> ApiResponse<T> {
    /// Discards the metadata and returns the decoded body.
    pub fn into_data(self) -> T {
        self.data
    }
}

impl Client {
    /// Sends `request` and decodes the response body as JSON.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `ctx` ends before the call completes.
    /// - [`Error::Transport`] if the transport or the body read fails.
    /// - [`Error::Decode`] if the body is empty or is not valid JSON for `T`.
    pub async fn send<T>(
        &self,
        ctx: &CallContext,
        request: SignedRequest,
    ) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
    {
        #[cfg(feature = "telemetry")]
        let span = dispatch_span(&request);
        let fut = self.send_json(ctx, request);
        #[cfg(feature = "telemetry")]
        let fut = fut.instrument(span);
        fut.await
    }

    /// Sends `request` and copies the response body into `sink` unmodified.
    ///
    /// Bytes already written stay in the sink if the call fails part way.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if `ctx` ends before the body is fully copied.
    /// - [`Error::Transport`] if the transport or the body read fails.
    /// - [`Error::Decode`] with [`DecodeError::Sink`] if writing to `sink` fails.
    pub async fn send_to<W>(
        &self,
        ctx: &CallContext,
        request: SignedRequest,
        sink: &mut W,
    ) -> Result<RawResponse, Error>
    where
        W: io::Write + Send + ?Sized,
    {
        #[cfg(feature = "telemetry")]
        let span = dispatch_span(&request);
        let fut = self.send_raw(ctx, request, sink);
        #[cfg(feature = "telemetry")]
        let fut = fut.instrument(span);
        fut.await
    }

    async fn send_json<T>(
        &self,
        ctx: &CallContext,
        request: SignedRequest,
    ) -> Result<ApiResponse<T>, Error>
    where
        T: DeserializeOwned,
    {
        let result = async {
            let response = self.execute(ctx, request).await?;
            let raw = RawResponse::from_response(&response);
            let mut body = Vec::new();
            read_body(ctx, response, &raw, |chunk| {
                body.extend_from_slice(chunk);
                Ok(())
            })
            .await?;
            match serde_json::from_slice(&body) {
                Ok(data) => Ok(ApiResponse { data, raw }),
                Err(e) => Err(Error::Decode {
                    source: DecodeError::Json(e),
                    raw: Box::new(raw),
                }),
            }
        }
        .await;
        record_result_on_span(&result);
        result
    }

    async fn send_raw<W>(
        &self,
        ctx: &CallContext,
        request: SignedRequest,
        sink: &mut W,
    ) -> Result<RawResponse, Error>
    where
        W: io::Write + Send + ?Sized,
    {
        let result = async {
            let response = self.execute(ctx, request).await?;
            let raw = RawResponse::from_response(&response);
            read_body(ctx, response, &raw, |chunk| sink.write_all(chunk)).await?;
            sink.flush().map_err(|e| sink_error(e, &raw))?;
            Ok(raw)
        }
        .await;
        record_result_on_span(&result);
        result
    }

    /// Hands the request to the transport, racing it against `ctx`.
    async fn execute(
        &self,
        ctx: &CallContext,
        request: SignedRequest,
    ) -> Result<reqwest::Response, Error> {
        if let Some(reason) = ctx.error() {
            return Err(Error::Cancelled(reason));
        }
        let result = tokio::select! {
            biased;
            reason = ctx.done() => return Err(Error::Cancelled(reason)),
            result = self.transport().execute(request.into_reqwest()) => result,
        };
        // The context wins over whatever the transport produced.
        if let Some(reason) = ctx.error() {
            return Err(Error::Cancelled(reason));
        }
        let response = result.map_err(|source| Error::Transport { source, raw: None })?;
        record_status(response.status());
        Ok(response)
    }
}

/// Reads the body chunk by chunk, checking `ctx` between chunks.
async fn read_body<F>(
    ctx: &CallContext,
    mut response: reqwest::Response,
    raw: &RawResponse,
    mut on_chunk: F,
) -> Result<(), Error>
where
    F: FnMut(&[u8]) -> io::Result<()> + Send,
{
    loop {
        let chunk = tokio::select! {
            biased;
            reason = ctx.done() => return Err(Error::Cancelled(reason)),
            chunk = response.chunk() => chunk,
        };
        match chunk {
            Ok(Some(bytes)) => on_chunk(&bytes).map_err(|e| sink_error(e, raw))?,
            Ok(None) => return Ok(()),
            Err(e) => {
                if let Some(reason) = ctx.error() {
                    return Err(Error::Cancelled(reason));
                }
                return Err(Error::Transport {
                    source: e.into(),
                    raw: Some(Box::new(raw.clone())),
                });
            }
        }
    }
}

fn sink_error(error: io::Error, raw: &RawResponse) -> Error {
    Error::Decode {
        source: DecodeError::Sink(error),
        raw: Box::new(raw.clone()),
    }
}

#[cfg(feature = "telemetry")]
fn dispatch_span(request: &SignedRequest) -> Span {
    tracing::info_span!(
        "linepay.dispatch",
        method = %request.method(),
        path = request.url().path(),
        http.status_code = tracing::field::Empty,
        otel.status_code = tracing::field::Empty,
        error.message = tracing::field::Empty,
    )
}

#[cfg(feature = "telemetry")]
fn record_status(status: StatusCode) {
    Span::current().record("http.status_code", status.as_u16());
    tracing::debug!(status = status.as_u16(), "LINE Pay response received");
}

#[cfg(not(feature = "telemetry"))]
const fn record_status(_status: StatusCode) {}

/// Records the outcome of a call on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::WARN, error = %err, "LINE Pay request failed");
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}
