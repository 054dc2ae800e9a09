//! The signed transfer intent and the domain that binds it to a deployment.

use serde::{Deserialize, Serialize};

use crate::address::TronAddress;
use crate::amount::TokenAmount;
use crate::timestamp::UnixTimestamp;

/// Protocol version carried in every authorization.
pub const PERMIT_VERSION: u64 = 1;

/// Domain `name` of the gas-free controller.
pub const DOMAIN_NAME: &str = "GasFreeController";

/// Domain `version` of the gas-free controller.
pub const DOMAIN_VERSION: &str = "V1.0.0";

/// A `PermitTransfer` authorization signed by `user`.
///
/// Field order matches the on-chain struct definition and is part of the
/// hashing contract. On the wire addresses travel in Base58Check form and
/// integers as JSON numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAuthorization {
    /// TRC-20 contract being moved.
    pub token: TronAddress,
    /// Relayer allowed to execute the transfer.
    pub service_provider: TronAddress,
    /// Authorizing account.
    pub user: TronAddress,
    /// Destination account.
    pub receiver: TronAddress,
    /// Amount to transfer in base units.
    pub value: TokenAmount,
    /// Upper bound on the fee the relayer may deduct.
    pub max_fee: TokenAmount,
    /// Time after which the authorization is void.
    pub deadline: UnixTimestamp,
    /// Protocol version, see [`PERMIT_VERSION`].
    pub version: u64,
    /// Proxy account nonce this authorization consumes.
    pub nonce: u64,
}

impl TransferAuthorization {
    /// Creates an authorization for the current protocol version.
    ///
    /// `max_fee`, `deadline` and `nonce` start at zero and are set with the
    /// `with_*` methods.
    #[must_use]
    pub const fn new(
        token: TronAddress,
        service_provider: TronAddress,
        user: TronAddress,
        receiver: TronAddress,
        value: TokenAmount,
    ) -> Self {
        Self {
            token,
            service_provider,
            user,
            receiver,
            value,
            max_fee: TokenAmount::ZERO,
            deadline: UnixTimestamp::from_secs(0),
            version: PERMIT_VERSION,
            nonce: 0,
        }
    }

    /// Sets the maximum fee.
    #[must_use]
    pub const fn with_max_fee(mut self, max_fee: TokenAmount) -> Self {
        self.max_fee = max_fee;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: UnixTimestamp) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the nonce.
    #[must_use]
    pub const fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }
}

/// The `EIP712Domain` a signature is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningDomain {
    /// Protocol name, [`DOMAIN_NAME`] for every known deployment.
    pub name: String,
    /// Protocol version string, [`DOMAIN_VERSION`] for every known deployment.
    pub version: String,
    /// Numeric chain identifier.
    pub chain_id: u64,
    /// Controller contract that validates the signature.
    pub verifying_contract: TronAddress,
}

impl SigningDomain {
    /// Creates the gas-free controller domain for a chain.
    #[must_use]
    pub fn new(chain_id: u64, verifying_contract: TronAddress) -> Self {
        Self {
            name: DOMAIN_NAME.to_owned(),
            version: DOMAIN_VERSION.to_owned(),
            chain_id,
            verifying_contract,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> TronAddress {
        s.parse().unwrap()
    }

    #[test]
    fn wire_form_preserves_every_field() {
        let auth = TransferAuthorization::new(
            addr("TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf"),
            addr("TKtWbdzEq5ss9vTS9kwRhBp5mXmBfBns3E"),
            addr("TE2H9hWjzYdwzDFRJfx9BFhr4MmjH1CHaz"),
            addr("TE2H9hWjzYdwzDFRJfx9BFhr4MmjH1CHaz"),
            TokenAmount::from(500_000u64),
        )
        .with_max_fee(TokenAmount::from(2_050_000u64))
        .with_deadline(UnixTimestamp::from_secs(1_767_225_780))
        .with_nonce(7);

        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["serviceProvider"], "TKtWbdzEq5ss9vTS9kwRhBp5mXmBfBns3E");
        assert_eq!(json["maxFee"], 2_050_000);
        assert_eq!(json["deadline"], 1_767_225_780u64);
        assert_eq!(json["version"], 1);
        assert_eq!(json["nonce"], 7);

        let back: TransferAuthorization = serde_json::from_value(json).unwrap();
        assert_eq!(back, auth);
    }

    #[test]
    fn past_deadlines_survive_the_wire() {
        let auth = TransferAuthorization::new(
            TronAddress::default(),
            TronAddress::default(),
            TronAddress::default(),
            TronAddress::default(),
            TokenAmount::ZERO,
        )
        .with_deadline(UnixTimestamp::from_secs(1));
        let json = serde_json::to_string(&auth).unwrap();
        let back: TransferAuthorization = serde_json::from_str(&json).unwrap();
        assert_eq!(back.deadline.as_secs(), 1);
    }
}
