//! Client configuration.
//!
//! A [`Client`] holds the channel credentials, the endpoint base, the
//! authentication scheme and the transport. It is immutable once built and
//! cheap to clone, so one instance can serve any number of concurrent calls.
//!
//! ```
//! use linepay::{AuthScheme, Client};
//!
//! let client = Client::builder("channel-id", "channel-secret")
//!     .with_sandbox()
//!     .with_auth_scheme(AuthScheme::Signature)
//!     .build()
//!     .unwrap();
//! assert_eq!(client.endpoint_base().as_str(), "https://sandbox-api-pay.line.me/");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use http::HeaderValue;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{API_ENDPOINT_BASE_PRODUCTION, API_ENDPOINT_BASE_SANDBOX};
use crate::error::Error;
use crate::transport::Transport;

/// Authentication protocol used for outbound requests.
///
/// The two schemes are never combined in one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// v3: per-request nonce plus HMAC-SHA256 signature over the canonical message.
    #[default]
    Signature,
    /// v2 legacy: the channel secret is sent verbatim in `X-LINE-ChannelSecret`.
    ChannelSecret,
}

impl AuthScheme {
    /// Returns the configuration name of the scheme.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::ChannelSecret => "channel-secret",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "signature" | "v3" => Ok(Self::Signature),
            "channel-secret" | "v2" => Ok(Self::ChannelSecret),
            other => Err(Error::validation(format!(
                "unknown auth scheme {other:?}, expected \"signature\" or \"channel-secret\""
            ))),
        }
    }
}

/// LINE Pay API client.
#[derive(Clone)]
pub struct Client {
    channel_id: String,
    channel_secret: String,
    pub(crate) channel_id_header: HeaderValue,
    pub(crate) channel_secret_header: Option<HeaderValue>,
    endpoint_base: Url,
    auth_scheme: AuthScheme,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a client for the production endpoint with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the identity or secret is empty.
    pub fn new(
        channel_id: impl Into<String>,
        channel_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Self::builder(channel_id, channel_secret).build()
    }

    /// Starts building a client.
    pub fn builder(
        channel_id: impl Into<String>,
        channel_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(channel_id, channel_secret)
    }

    /// Returns the merchant channel identity.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Returns the configured endpoint base.
    #[must_use]
    pub const fn endpoint_base(&self) -> &Url {
        &self.endpoint_base
    }

    /// Returns the authentication scheme.
    #[must_use]
    pub const fn auth_scheme(&self) -> AuthScheme {
        self.auth_scheme
    }

    pub(crate) fn channel_secret(&self) -> &str {
        &self.channel_secret
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        &*self.transport
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("channel_id", &self.channel_id)
            .field("channel_secret", &"<redacted>")
            .field("endpoint_base", &self.endpoint_base.as_str())
            .field("auth_scheme", &self.auth_scheme)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
///
/// Options apply in call order; a later option overrides an earlier one.
pub struct ClientBuilder {
    channel_id: String,
    channel_secret: String,
    endpoint_base: Option<String>,
    auth_scheme: AuthScheme,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a builder with the given credentials.
    pub fn new(channel_id: impl Into<String>, channel_secret: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_secret: channel_secret.into(),
            endpoint_base: None,
            auth_scheme: AuthScheme::default(),
            transport: None,
        }
    }

    /// Sets the endpoint base URL. It must be absolute and end with `/`.
    #[must_use]
    pub fn with_endpoint_base(mut self, endpoint_base: impl Into<String>) -> Self {
        self.endpoint_base = Some(endpoint_base.into());
        self
    }

    /// Targets the sandbox environment.
    #[must_use]
    pub fn with_sandbox(self) -> Self {
        self.with_endpoint_base(API_ENDPOINT_BASE_SANDBOX)
    }

    /// Targets the production environment.
    #[must_use]
    pub fn with_production(self) -> Self {
        self.with_endpoint_base(API_ENDPOINT_BASE_PRODUCTION)
    }

    /// Sets the transport used to execute requests.
    #[must_use]
    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Sets a transport shared with other clients.
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the authentication scheme.
    #[must_use]
    pub const fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    /// Validates the configuration and builds the client.
    ///
    /// Without an explicit transport a new [`reqwest::Client`] is created for
    /// this client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the identity or secret is empty, if a
    /// credential cannot be sent as a header value, or if the endpoint base is
    /// not an absolute `http`/`https` URL.
    pub fn build(self) -> Result<Client, Error> {
        if self.channel_id.is_empty() {
            return Err(Error::validation("missing channel id"));
        }
        if self.channel_secret.is_empty() {
            return Err(Error::validation("missing channel secret"));
        }
        let channel_id_header = HeaderValue::from_str(&self.channel_id)
            .map_err(|_| Error::validation("channel id is not a valid header value"))?;
        let channel_secret_header = match self.auth_scheme {
            AuthScheme::Signature => None,
            AuthScheme::ChannelSecret => {
                let mut value = HeaderValue::from_str(&self.channel_secret)
                    .map_err(|_| Error::validation("channel secret is not a valid header value"))?;
                value.set_sensitive(true);
                Some(value)
            }
        };

        let raw_base = self
            .endpoint_base
            .as_deref()
            .unwrap_or(API_ENDPOINT_BASE_PRODUCTION);
        let endpoint_base = Url::parse(raw_base)
            .map_err(|e| Error::validation(format!("invalid endpoint base {raw_base:?}: {e}")))?;
        if !matches!(endpoint_base.scheme(), "http" | "https") || endpoint_base.cannot_be_a_base()
        {
            return Err(Error::validation(format!(
                "endpoint base {raw_base:?} must be an absolute http(s) URL"
            )));
        }

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(reqwest::Client::new()));

        Ok(Client {
            channel_id: self.channel_id,
            channel_secret: self.channel_secret,
            channel_id_header,
            channel_secret_header,
            endpoint_base,
            auth_scheme: self.auth_scheme,
            transport,
        })
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("channel_id", &self.channel_id)
            .field("channel_secret", &"<redacted>")
            .field("endpoint_base", &self.endpoint_base)
            .field("auth_scheme", &self.auth_scheme)
            .field("has_transport", &self.transport.is_some())
            .finish()
    }
}
