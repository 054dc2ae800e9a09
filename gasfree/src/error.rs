//! Error taxonomy shared by every gas-free crate.
//!
//! Core operations (address parsing, amount handling, hashing and signing)
//! return [`GasFreeError`]. Transport crates wrap it alongside their own
//! HTTP failures.

/// Errors raised by gas-free protocol operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GasFreeError {
    /// A numeric field was negative, non-integral or out of the 256-bit range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The private key is malformed or outside the secp256k1 scalar range.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// A TRON address failed to decode (bad alphabet, checksum, prefix or length).
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A signature is not 65 bytes of `r || s || v` or does not recover.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A struct value did not match its declared field types.
    #[error("struct encoding mismatch: {0}")]
    EncodingMismatch(String),

    /// The relay answered with a non-success envelope.
    #[error("relay rejected request (code {code}): {message}")]
    RelayRejected {
        /// Envelope `code` returned by the relay.
        code: i64,
        /// Relay supplied `message` or `reason`.
        message: String,
    },

    /// The relay rejected a submission because its nonce was already consumed.
    ///
    /// Callers should refetch the account and rebuild the authorization.
    #[error("stale nonce (code {code}): {message}")]
    StaleNonce {
        /// Envelope `code` returned by the relay.
        code: i64,
        /// Relay supplied `message` or `reason`.
        message: String,
    },

    /// Polling ran out of attempts before a terminal state was observed.
    #[error("transfer {trace_id} unresolved after {attempts} status checks")]
    Timeout {
        /// Identifier being polled (relay trace id or ledger tx id).
        trace_id: String,
        /// Number of status checks performed.
        attempts: u32,
    },
}

impl GasFreeError {
    /// Classifies a non-success relay envelope.
    ///
    /// The relay does not expose a dedicated nonce error code, so any
    /// rejection whose message mentions the nonce is reported as
    /// [`GasFreeError::StaleNonce`].
    #[must_use]
    pub fn from_relay(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_ascii_lowercase().contains("nonce") {
            Self::StaleNonce { code, message }
        } else {
            Self::RelayRejected { code, message }
        }
    }

    /// Returns `true` when rebuilding the authorization with a fresh nonce may succeed.
    #[must_use]
    pub const fn is_stale_nonce(&self) -> bool {
        matches!(self, Self::StaleNonce { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_rejections_are_classified_as_stale() {
        let err = GasFreeError::from_relay(400, "Invalid Nonce: expected 4");
        assert!(err.is_stale_nonce());
        assert_eq!(
            err,
            GasFreeError::StaleNonce {
                code: 400,
                message: "Invalid Nonce: expected 4".into()
            }
        );
    }

    #[test]
    fn other_rejections_stay_generic() {
        let err = GasFreeError::from_relay(500, "insufficient balance");
        assert!(!err.is_stale_nonce());
        assert_eq!(
            err.to_string(),
            "relay rejected request (code 500): insufficient balance"
        );
    }
}
