use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::address::TronAddress;
use crate::amount::TokenAmount;
use crate::authorization::TransferAuthorization;

/// Body of `POST /{network}/api/v1/gasfree/submit`.
///
/// The authorization fields are flattened next to a client-generated
/// `requestId` and the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Unique id of this submission, chosen by the client.
    pub request_id: String,
    /// The signed authorization.
    #[serde(flatten)]
    pub authorization: TransferAuthorization,
    /// 65-byte `r || s || v` signature as lowercase hex without `0x`.
    pub sig: String,
}

impl SubmitRequest {
    /// Builds a request with a fresh random `requestId`.
    #[must_use]
    pub fn new(authorization: TransferAuthorization, sig: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            authorization,
            sig: sig.into(),
        }
    }

    /// Replaces the generated `requestId`.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

/// Payload returned by a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Trace id used to poll the submission.
    pub id: String,
}

/// Execution state reported by the relay.
///
/// The relay reports states both by name (`"SUCCEED"`) and by numeric code
/// (`3`) depending on the endpoint version, so the set is kept open. Which
/// tags count as terminal is configured on the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateTag {
    /// A numeric state code.
    Code(i64),
    /// A named state such as `WAITING`, `INPROGRESS` or `SUCCEED`.
    Name(String),
}

impl StateTag {
    /// Builds a named tag.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }
}

impl Display for StateTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for StateTag {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<i64> for StateTag {
    fn from(code: i64) -> Self {
        Self::Code(code)
    }
}

/// Payload of `GET /{network}/api/v1/gasfree/{traceId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStatus {
    /// Trace id.
    pub id: String,
    /// Current execution state.
    pub state: StateTag,
    /// Authorizing user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_address: Option<TronAddress>,
    /// Receiver of the transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_address: Option<TronAddress>,
    /// Transferred value, as reported by newer relay versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_amount: Option<TokenAmount>,
    /// Transferred value, as reported by older relay versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<TokenAmount>,
    /// Nonce consumed by the authorization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Creation time, passed through as sent (epoch millis or text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<serde_json::Value>,
    /// Activation fee actually charged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_activate_fee: Option<TokenAmount>,
    /// Transfer fee actually charged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_transfer_fee: Option<TokenAmount>,
    /// Total fee actually charged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_total_fee: Option<TokenAmount>,
    /// On-chain transaction hash once executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn_hash: Option<String>,
}

impl TransferStatus {
    /// Returns the transferred value from whichever field the relay filled.
    #[must_use]
    pub fn value(&self) -> Option<TokenAmount> {
        self.txn_amount.or(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::UnixTimestamp;

    #[test]
    fn submit_body_flattens_the_authorization() {
        let user: TronAddress = "TE2H9hWjzYdwzDFRJfx9BFhr4MmjH1CHaz".parse().unwrap();
        let auth = TransferAuthorization::new(
            "TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf".parse().unwrap(),
            "TKtWbdzEq5ss9vTS9kwRhBp5mXmBfBns3E".parse().unwrap(),
            user,
            user,
            TokenAmount::from(500_000u64),
        )
        .with_max_fee(TokenAmount::from(2_050_000u64))
        .with_deadline(UnixTimestamp::from_secs(1_767_225_780));

        let request = SubmitRequest::new(auth, "ab".repeat(65));
        assert!(Uuid::parse_str(&request.request_id).is_ok());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user"], "TE2H9hWjzYdwzDFRJfx9BFhr4MmjH1CHaz");
        assert_eq!(json["value"], 500_000);
        assert_eq!(json["version"], 1);
        assert_eq!(json["nonce"], 0);
        assert_eq!(json["sig"].as_str().unwrap().len(), 130);
        assert!(json.get("authorization").is_none());

        let back: SubmitRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn fresh_requests_get_distinct_ids() {
        let auth = TransferAuthorization::new(
            TronAddress::default(),
            TronAddress::default(),
            TronAddress::default(),
            TronAddress::default(),
            TokenAmount::ZERO,
        );
        let a = SubmitRequest::new(auth.clone(), "");
        let b = SubmitRequest::new(auth, "");
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn state_accepts_names_and_codes() {
        let named: TransferStatus =
            serde_json::from_str(r#"{"id":"t1","state":"INPROGRESS","amount":500000}"#).unwrap();
        assert_eq!(named.state, StateTag::name("INPROGRESS"));
        assert_eq!(named.value(), Some(TokenAmount::from(500_000u64)));

        let coded: TransferStatus = serde_json::from_str(
            r#"{"id":"t2","state":3,"txnAmount":1,"txnHash":"ff","createdAt":1767225600000}"#,
        )
        .unwrap();
        assert_eq!(coded.state, StateTag::Code(3));
        assert_eq!(coded.value(), Some(TokenAmount::from(1u64)));
        assert_eq!(coded.state.to_string(), "3");
    }
}
