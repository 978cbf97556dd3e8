//! Client configuration loaded from the environment.
//!
//! # Environment Variables
//!
//! - `LINE_PAY_CHANNEL_ID`: merchant channel identity (required)
//! - `LINE_PAY_CHANNEL_SECRET`: channel secret (required)
//! - `LINE_PAY_ENDPOINT_BASE`: endpoint base URL (default: production)
//! - `LINE_PAY_AUTH_SCHEME`: `signature` (default) or `channel-secret`
//!
//! Empty values count as unset. Reading `.env` files is left to the
//! application.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::{AuthScheme, ClientBuilder};
use crate::error::Error;

/// Environment variable holding the channel identity.
pub const CHANNEL_ID_ENV: &str = "LINE_PAY_CHANNEL_ID";
/// Environment variable holding the channel secret.
pub const CHANNEL_SECRET_ENV: &str = "LINE_PAY_CHANNEL_SECRET";
/// Environment variable holding the endpoint base URL.
pub const ENDPOINT_BASE_ENV: &str = "LINE_PAY_ENDPOINT_BASE";
/// Environment variable selecting the authentication scheme.
pub const AUTH_SCHEME_ENV: &str = "LINE_PAY_AUTH_SCHEME";

/// Settings needed to build a [`Client`](crate::Client).
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Merchant channel identity.
    pub channel_id: String,

    /// Channel secret; never printed by `Debug`.
    pub channel_secret: String,

    /// Endpoint base URL (default: production).
    #[serde(default)]
    pub endpoint_base: Option<String>,

    /// Authentication scheme (default: `signature`).
    #[serde(default)]
    pub auth_scheme: AuthScheme,
}

impl ClientConfig {
    /// Creates a configuration for the production endpoint.
    pub fn new(channel_id: impl Into<String>, channel_secret: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_secret: channel_secret.into(),
            endpoint_base: None,
            auth_scheme: AuthScheme::default(),
        }
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required variable is missing or
    /// `LINE_PAY_AUTH_SCHEME` holds an unknown scheme.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| {
            var(name).ok_or_else(|| Error::validation(format!("missing {name}")))
        };

        let auth_scheme = match var(AUTH_SCHEME_ENV) {
            Some(scheme) => scheme.parse()?,
            None => AuthScheme::default(),
        };

        Ok(Self {
            channel_id: required(CHANNEL_ID_ENV)?,
            channel_secret: required(CHANNEL_SECRET_ENV)?,
            endpoint_base: var(ENDPOINT_BASE_ENV),
            auth_scheme,
        })
    }

    /// Returns a [`ClientBuilder`] preloaded with this configuration.
    #[must_use]
    pub fn builder(&self) -> ClientBuilder {
        let builder = ClientBuilder::new(self.channel_id.clone(), self.channel_secret.clone())
            .with_auth_scheme(self.auth_scheme);
        match &self.endpoint_base {
            Some(base) => builder.with_endpoint_base(base.clone()),
            None => builder,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("channel_id", &self.channel_id)
            .field("channel_secret", &"<redacted>")
            .field("endpoint_base", &self.endpoint_base)
            .field("auth_scheme", &self.auth_scheme)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::constants::API_ENDPOINT_BASE_SANDBOX;
    use crate::error::ErrorKind;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_minimal() {
        let config = ClientConfig::from_lookup(env(&[
            (CHANNEL_ID_ENV, "testid"),
            (CHANNEL_SECRET_ENV, "testsecret"),
        ]))
        .unwrap();
        assert_eq!(config.channel_id, "testid");
        assert_eq!(config.channel_secret, "testsecret");
        assert!(config.endpoint_base.is_none());
        assert_eq!(config.auth_scheme, AuthScheme::Signature);
    }

    #[test]
    fn test_from_lookup_all_fields() {
        let config = ClientConfig::from_lookup(env(&[
            (CHANNEL_ID_ENV, "testid"),
            (CHANNEL_SECRET_ENV, "testsecret"),
            (ENDPOINT_BASE_ENV, API_ENDPOINT_BASE_SANDBOX),
            (AUTH_SCHEME_ENV, "channel-secret"),
        ]))
        .unwrap();
        assert_eq!(config.auth_scheme, AuthScheme::ChannelSecret);

        let client = config.builder().build().unwrap();
        assert_eq!(client.endpoint_base().as_str(), API_ENDPOINT_BASE_SANDBOX);
        assert_eq!(client.auth_scheme(), AuthScheme::ChannelSecret);
    }

    #[test]
    fn test_missing_or_empty_required_vars() {
        for vars in [
            &[(CHANNEL_ID_ENV, "testid")][..],
            &[(CHANNEL_SECRET_ENV, "testsecret")][..],
            &[(CHANNEL_ID_ENV, ""), (CHANNEL_SECRET_ENV, "testsecret")][..],
        ] {
            let err = ClientConfig::from_lookup(env(vars)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn test_unknown_auth_scheme() {
        let err = ClientConfig::from_lookup(env(&[
            (CHANNEL_ID_ENV, "testid"),
            (CHANNEL_SECRET_ENV, "testsecret"),
            (AUTH_SCHEME_ENV, "basic"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("basic"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"channel_id":"testid","channel_secret":"testsecret"}"#)
                .unwrap();
        assert!(config.endpoint_base.is_none());
        assert_eq!(config.auth_scheme, AuthScheme::Signature);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", ClientConfig::new("testid", "testsecret"));
        assert!(!debug.contains("testsecret"));
    }
}
