//! Error types for the HTTP clients.
//!
//! [`RelayError`] captures detailed failure contexts, including
//! - URL construction
//! - HTTP transport failures
//! - JSON deserialization errors
//! - Unexpected HTTP status responses
//! - Ledger node rejections
//!
//! Protocol level failures (relay rejections, stale nonces, polling
//! timeouts, signing errors) travel as [`RelayError::GasFree`].

use gasfree::GasFreeError;
use reqwest::StatusCode;

/// Errors returned by the relay and ledger clients and the flows built on them.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// URL parse error.
    #[error("URL parse error: {context}: {source}")]
    UrlParse {
        /// Human-readable context.
        context: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
    /// HTTP transport error.
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// JSON deserialization error.
    #[error("Failed to deserialize JSON: {context}: {source}")]
    JsonDeserialization {
        /// Human-readable context.
        context: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
    /// Unexpected HTTP status code with a body that is not a relay envelope.
    #[error("Unexpected HTTP status {status}: {context}: {body}")]
    HttpStatus {
        /// Human-readable context.
        context: &'static str,
        /// The HTTP status code.
        status: StatusCode,
        /// The response body.
        body: String,
    },
    /// Failed to read response body.
    #[error("Failed to read response body as text: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Credentials could not be turned into request headers.
    #[error("Invalid credentials: {0}")]
    Auth(String),
    /// The ledger node refused or could not process a request.
    #[error("Ledger error: {context}: {message}")]
    Ledger {
        /// Human-readable context.
        context: &'static str,
        /// Node supplied description.
        message: String,
    },
    /// Protocol level failure.
    #[error(transparent)]
    GasFree(#[from] GasFreeError),
}

impl RelayError {
    /// Returns the protocol error, if this is one.
    #[must_use]
    pub const fn as_gasfree(&self) -> Option<&GasFreeError> {
        match self {
            Self::GasFree(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns `true` when the relay rejected a submission for a consumed nonce.
    #[must_use]
    pub fn is_stale_nonce(&self) -> bool {
        self.as_gasfree().is_some_and(GasFreeError::is_stale_nonce)
    }

    pub(crate) fn ledger(context: &'static str, message: impl Into<String>) -> Self {
        Self::Ledger {
            context,
            message: message.into(),
        }
    }
}
