//! Signed request construction.
//!
//! [`Client::new_request`] turns a method, a path relative to the endpoint
//! base and a [`Payload`] into a [`SignedRequest`]. GET and DELETE carry
//! their parameters in the query string, POST and PUT carry a JSON body.
//! The bytes that get signed are exactly the bytes that go on the wire.

use std::fmt;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use serde::Serialize;
use url::Url;

use crate::client::{AuthScheme, Client};
use crate::constants::{
    AUTHORIZATION_HEADER, AUTHORIZATION_NONCE_HEADER, CHANNEL_ID_HEADER, CHANNEL_SECRET_HEADER,
    CONTENT_TYPE_JSON,
};
use crate::error::{EncodingError, Error, PayloadKind};
use crate::query::{QueryParams, QueryString, normalize_path};
use crate::signature;

/// HTTP methods used by the LINE Pay API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Returns the method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` for methods that carry a JSON body instead of a query.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// A JSON body serialized once, ready to be signed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBody(Vec<u8>);

impl JsonBody {
    /// Serializes `body`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Json`] if serialization fails.
    pub fn new<T: Serialize + ?Sized>(body: &T) -> Result<Self, EncodingError> {
        Ok(Self(serde_json::to_vec(body)?))
    }

    /// Returns the serialized bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Signable content attached to a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    /// No query and no body.
    #[default]
    None,
    /// Query parameters, for GET and DELETE.
    Query(QueryString),
    /// JSON body, for POST and PUT.
    Json(JsonBody),
}

impl Payload {
    /// Encodes `params` as a query payload.
    #[must_use]
    pub fn query<Q: QueryParams + ?Sized>(params: &Q) -> Self {
        Self::Query(QueryString::from_params(params))
    }

    /// Serializes `body` as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Json`] if serialization fails.
    pub fn json<T: Serialize + ?Sized>(body: &T) -> Result<Self, EncodingError> {
        JsonBody::new(body).map(Self::Json)
    }
}

/// An authenticated request ready for dispatch.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    path: String,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    nonce: Option<String>,
}

impl SignedRequest {
    /// Returns the method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the path and query relative to the endpoint base.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the absolute request URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body bytes, if the request has a body.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Returns the nonce that was signed, under the signature scheme.
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.nonce.as_deref()
    }

    /// Converts into a [`reqwest::Request`].
    #[must_use]
    pub fn into_reqwest(self) -> reqwest::Request {
        let mut request = reqwest::Request::new(self.method.into(), self.url);
        *request.headers_mut() = self.headers;
        if let Some(body) = self.body {
            *request.body_mut() = Some(body.into());
        }
        request
    }
}

impl Client {
    /// Builds a signed request.
    ///
    /// `path` is relative to the endpoint base; a leading `/` is ignored.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the endpoint base has no trailing `/`.
    /// - [`Error::Encoding`] if the path is malformed or the payload kind
    ///   does not match the method.
    pub fn new_request(
        &self,
        method: Method,
        path: &str,
        payload: Payload,
    ) -> Result<SignedRequest, Error> {
        let base = self.endpoint_base();
        if !base.path().ends_with('/') {
            return Err(Error::validation(format!(
                "endpoint base must have a trailing slash, but {base} does not"
            )));
        }
        let path = normalize_path(path)?;

        let (query, body) = match payload {
            Payload::None => (None, None),
            Payload::Query(query) if !method.has_body() => (Some(query), None),
            Payload::Json(json) if method.has_body() => (None, Some(json.0)),
            Payload::Query(_) => {
                return Err(EncodingError::PayloadMismatch {
                    method,
                    payload: PayloadKind::Query,
                }
                .into());
            }
            Payload::Json(_) => {
                return Err(EncodingError::PayloadMismatch {
                    method,
                    payload: PayloadKind::Json,
                }
                .into());
            }
        };

        let target = match &query {
            Some(query) if !query.is_empty() => format!("{path}?{query}"),
            _ => path.to_owned(),
        };
        let url = base
            .join(&target)
            .map_err(|_| EncodingError::InvalidPath {
                path: target.clone(),
                reason: "cannot be resolved against the endpoint base",
            })?;
        if url.path().strip_prefix(base.path()) != Some(path) {
            return Err(EncodingError::InvalidPath {
                path: path.to_owned(),
                reason: "does not resolve verbatim below the endpoint base",
            }
            .into());
        }

        let mut headers = HeaderMap::with_capacity(4);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(CHANNEL_ID_HEADER, self.channel_id_header.clone());

        let nonce = match (self.auth_scheme(), &self.channel_secret_header) {
            (AuthScheme::ChannelSecret, Some(secret)) => {
                headers.insert(CHANNEL_SECRET_HEADER, secret.clone());
                None
            }
            _ => {
                let content = match (&query, &body) {
                    (Some(query), _) => query.as_str().as_bytes(),
                    (None, Some(body)) => body.as_slice(),
                    (None, None) => &[],
                };
                let nonce = signature::new_nonce();
                let message =
                    signature::canonical_message(self.channel_secret(), path, content, &nonce);
                let mut authorization =
                    HeaderValue::try_from(signature::sign(self.channel_secret(), &message))
                        .expect("base64 is a valid header value");
                authorization.set_sensitive(true);
                headers.insert(
                    AUTHORIZATION_NONCE_HEADER,
                    HeaderValue::try_from(nonce.as_str()).expect("uuid is a valid header value"),
                );
                headers.insert(AUTHORIZATION_HEADER, authorization);
                Some(nonce)
            }
        };

        Ok(SignedRequest {
            method,
            path: target,
            url,
            headers,
            body,
            nonce,
        })
    }
}
