//! Request authentication for the relay API.
//!
//! The relay authenticates every call with an API key pair:
//!
//! ```text
//! Timestamp:     1700000000
//! Authorization: ApiKey <key>:<base64(HMAC-SHA256(secret, METHOD + fullPath + timestamp))>
//! ```
//!
//! `fullPath` includes the network segment (`/nile/api/v1/...`). The body is
//! not covered by the signature.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gasfree::UnixTimestamp;
use hmac::{Hmac, Mac};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use sha2::Sha256;

use crate::error::RelayError;

/// Header carrying the signing time in Unix seconds.
pub const TIMESTAMP_HEADER: HeaderName = HeaderName::from_static("timestamp");

type HmacSha256 = Hmac<Sha256>;

/// Generates authentication headers for relay requests.
///
/// Implement this trait to plug in custom credential storage or signing
/// (e.g. a remote secrets service).
pub trait AuthProvider: Send + Sync {
    /// Returns the headers authenticating `method path` at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Auth`] if the credentials cannot be encoded.
    fn auth_headers(
        &self,
        method: &Method,
        full_path: &str,
        timestamp: UnixTimestamp,
    ) -> Result<HeaderMap, RelayError>;
}

/// HMAC API key credentials issued by the relay operator.
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: String,
    api_secret: String,
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl ApiKeyAuth {
    /// Creates credentials from a key and its secret.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Returns the public API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Computes the base64 request signature.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Auth`] if the HMAC cannot be keyed.
    pub fn signature(
        &self,
        method: &Method,
        full_path: &str,
        timestamp: UnixTimestamp,
    ) -> Result<String, RelayError> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| RelayError::Auth(e.to_string()))?;
        mac.update(method.as_str().as_bytes());
        mac.update(full_path.as_bytes());
        mac.update(timestamp.to_string().as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

impl AuthProvider for ApiKeyAuth {
    fn auth_headers(
        &self,
        method: &Method,
        full_path: &str,
        timestamp: UnixTimestamp,
    ) -> Result<HeaderMap, RelayError> {
        let signature = self.signature(method, full_path, timestamp)?;
        let authorization = HeaderValue::from_str(&format!("ApiKey {}:{signature}", self.api_key))
            .map_err(|e| RelayError::Auth(format!("API key is not a valid header value: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from(timestamp.as_secs()));
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> ApiKeyAuth {
        ApiKeyAuth::new("test-key", "test-secret")
    }

    #[test]
    fn signature_covers_method_path_and_timestamp() {
        let ts = UnixTimestamp::from_secs(1_700_000_000);
        assert_eq!(
            auth()
                .signature(&Method::GET, "/nile/api/v1/config/token/all", ts)
                .unwrap(),
            "0nyrTDAIARSlT+WxH69ILaVpOZ7UTkEBwEH8uxR5B2I="
        );
        assert_eq!(
            auth()
                .signature(&Method::POST, "/nile/api/v1/gasfree/submit", ts)
                .unwrap(),
            "AgYx1El45FX4wutYXjimyW4uw5+4zoJFORD2VNm37Wo="
        );
    }

    #[test]
    fn headers_carry_key_and_timestamp() {
        let ts = UnixTimestamp::from_secs(1_700_000_000);
        let headers = auth()
            .auth_headers(&Method::GET, "/nile/api/v1/config/token/all", ts)
            .unwrap();
        assert_eq!(
            headers[AUTHORIZATION],
            "ApiKey test-key:0nyrTDAIARSlT+WxH69ILaVpOZ7UTkEBwEH8uxR5B2I="
        );
        assert_eq!(headers["timestamp"], "1700000000");
    }

    #[test]
    fn control_characters_in_key_are_rejected() {
        let bad = ApiKeyAuth::new("key\n", "secret");
        let err = bad
            .auth_headers(&Method::GET, "/nile/api/v1/address/x", UnixTimestamp::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, RelayError::Auth(_)));
    }

    #[test]
    fn debug_hides_secret() {
        let printed = format!("{:?}", auth());
        assert!(printed.contains("test-key"));
        assert!(!printed.contains("test-secret"));
    }
}
