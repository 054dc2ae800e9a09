//! Wire types of the gas-free relay API.
//!
//! Every relay endpoint answers with the same envelope:
//!
//! ```json
//! { "code": 200, "data": { ... }, "message": null }
//! ```
//!
//! A `code` other than `200` signals failure, with a human-readable
//! `message` or `reason`. All payloads use camelCase field names, addresses
//! in Base58Check form and amounts as JSON integers.
//!
//! # Key Types
//!
//! - [`ApiResponse`] - The response envelope
//! - [`TokenConfig`] / [`ServiceProvider`] - Relay configuration listings
//! - [`AccountSnapshot`] - Proxy account state for a user
//! - [`SubmitRequest`] / [`SubmitReceipt`] - Authorization submission
//! - [`TransferStatus`] / [`StateTag`] - Execution status of a submission

use serde::{Deserialize, Serialize};

use crate::error::GasFreeError;

mod account;
mod config;
mod transfer;

pub use account::{AccountSnapshot, AssetBalance};
pub use config::{ProviderLimits, ProviderList, ServiceProvider, TokenConfig, TokenList};
pub use transfer::{StateTag, SubmitReceipt, SubmitRequest, TransferStatus};

/// Envelope `code` that signals success.
pub const SUCCESS_CODE: i64 = 200;

/// The response envelope shared by every relay endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// `200` on success.
    pub code: i64,
    /// Endpoint specific payload, absent on failure.
    pub data: Option<T>,
    /// Human-readable failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Alternative failure description used by some endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Returns `true` if the envelope carries the success code.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Returns the relay's failure text, preferring `message` over `reason`.
    #[must_use]
    pub fn failure_text(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.reason.as_deref())
            .unwrap_or("relay returned no message")
    }

    /// Converts the envelope into its payload.
    ///
    /// A success envelope without `data` yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::RelayRejected`] (or [`GasFreeError::StaleNonce`]
    /// for nonce conflicts) when `code != 200`, carrying the relay text verbatim.
    pub fn into_data(self) -> Result<Option<T>, GasFreeError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(GasFreeError::from_relay(self.code, self.failure_text()))
        }
    }

    /// Converts the envelope into its payload, treating missing `data` as a rejection.
    ///
    /// # Errors
    ///
    /// Same as [`Self::into_data`], plus [`GasFreeError::RelayRejected`] when
    /// a success envelope carries no payload.
    pub fn into_required(self) -> Result<T, GasFreeError> {
        let code = self.code;
        self.into_data()?.ok_or_else(|| GasFreeError::RelayRejected {
            code,
            message: "relay response carried no data".to_owned(),
        })
    }
}
