//! Typed wrappers for the LINE Pay endpoints.
//!
//! Each wrapper is an `async fn` on [`Client`] that builds one signed
//! request and decodes the [`Envelope`] response. Business failures (a
//! `returnCode` other than `"0000"`) are returned as decoded envelopes, not
//! as errors.
//!
//! - [`payments`]: v3 online payments
//! - [`preapproved`]: v3 pre-approved (continuous) payments
//! - [`legacy`]: v2 endpoints, for channels on the channel-secret scheme

pub mod legacy;
pub mod payments;
pub mod preapproved;
pub mod types;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use types::{
    BasicResponse, EmptyBody, Envelope, PayInfo, PaymentRequestInfo, PaymentUrl,
    PreapprovedPaymentInfo, RefundEntry, RefundInfo, TransactionRecord,
};

use crate::client::Client;
use crate::context::CallContext;
use crate::dispatch::ApiResponse;
use crate::error::{EncodingError, Error};
use crate::query::QueryParams;
use crate::request::{Method, Payload};

/// Result of an endpoint wrapper.
pub type ApiResult<I> = Result<ApiResponse<Envelope<I>>, Error>;

impl Client {
    /// POSTs `body` as JSON to `path`.
    async fn post_json<B, I>(&self, ctx: &CallContext, path: &str, body: &B) -> ApiResult<I>
    where
        B: Serialize + ?Sized + Sync,
        I: DeserializeOwned,
    {
        let request = self.new_request(Method::Post, path, Payload::json(body)?)?;
        self.send(ctx, request).await
    }

    /// GETs `path` with `params` as the query string.
    async fn get_query<Q, I>(&self, ctx: &CallContext, path: &str, params: &Q) -> ApiResult<I>
    where
        Q: QueryParams + ?Sized + Sync,
        I: DeserializeOwned,
    {
        let request = self.new_request(Method::Get, path, Payload::query(params))?;
        self.send(ctx, request).await
    }
}

/// Checks an identifier that is interpolated into a path.
fn segment(value: &str) -> Result<&str, Error> {
    let reason = if value.is_empty() {
        "path identifier must not be empty"
    } else if value == "." || value == ".." {
        "path identifier must not be a dot segment"
    } else if !value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~'))
    {
        "path identifier must be URL-safe"
    } else {
        return Ok(value);
    };
    Err(EncodingError::InvalidPath {
        path: value.to_owned(),
        reason,
    }
    .into())
}

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::MockServer;

    use crate::client::{AuthScheme, Client};
    use crate::constants::AUTHORIZATION_NONCE_HEADER;
    use crate::signature;

    pub(crate) const SECRET: &str = "testsecret";
    /// Path of the endpoint base used by [`client_for`].
    pub(crate) const BASE_PATH: &str = "/test-api-pay/";

    pub(crate) fn client_for(server: &MockServer) -> Client {
        Client::builder("testid", SECRET)
            .with_endpoint_base(format!("{}{BASE_PATH}", server.uri()))
            .build()
            .unwrap()
    }

    pub(crate) fn legacy_client_for(server: &MockServer) -> Client {
        Client::builder("testid", SECRET)
            .with_endpoint_base(format!("{}/", server.uri()))
            .with_auth_scheme(AuthScheme::ChannelSecret)
            .build()
            .unwrap()
    }

    /// Asserts that the single received request carries a valid signature
    /// over its own wire bytes, and returns its body.
    pub(crate) async fn signed_body(server: &MockServer) -> Vec<u8> {
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        let content = match request.url.query() {
            Some(query) => query.as_bytes().to_vec(),
            None => request.body.clone(),
        };
        let nonce = request.headers[AUTHORIZATION_NONCE_HEADER].to_str().unwrap();
        let path = request.url.path().strip_prefix(BASE_PATH).unwrap();
        let message = signature::canonical_message(SECRET, path, &content, nonce);
        let signature = request.headers["X-LINE-Authorization"].to_str().unwrap();
        assert!(signature::verify(SECRET, &message, signature));
        request.body.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_segment_accepts_identifiers() {
        assert_eq!(segment("2019049910005496810").unwrap(), "2019049910005496810");
        assert_eq!(segment("RK9A4E1A2B3C4D5").unwrap(), "RK9A4E1A2B3C4D5");
    }

    #[test]
    fn test_segment_rejects_path_syntax() {
        for value in ["", "..", "a/b", "a?b", "a#b", "a b", "%2F"] {
            let err = segment(value).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Encoding, "{value:?}");
        }
    }
}
