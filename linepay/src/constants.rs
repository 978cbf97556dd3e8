//! HTTP-level constants for the LINE Pay API.

/// Production API base URL.
pub const API_ENDPOINT_BASE_PRODUCTION: &str = "https://api-pay.line.me/";

/// Sandbox API base URL.
pub const API_ENDPOINT_BASE_SANDBOX: &str = "https://sandbox-api-pay.line.me/";

/// Header carrying the merchant channel identity.
pub const CHANNEL_ID_HEADER: &str = "X-LINE-ChannelId";

/// Header carrying the per-request nonce (signature scheme).
pub const AUTHORIZATION_NONCE_HEADER: &str = "X-LINE-Authorization-Nonce";

/// Header carrying the base64 HMAC-SHA256 signature (signature scheme).
pub const AUTHORIZATION_HEADER: &str = "X-LINE-Authorization";

/// Header carrying the raw channel secret (legacy v2 scheme).
pub const CHANNEL_SECRET_HEADER: &str = "X-LINE-ChannelSecret";

/// Content type sent with every request.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// `returnCode` value the remote API uses for a successful call.
pub const SUCCESS_RETURN_CODE: &str = "0000";
