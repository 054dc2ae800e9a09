//! TRON account addresses.
//!
//! A TRON address is a 20-byte account identifier prefixed with the network
//! byte `0x41`. Its canonical text form is Base58Check over the 21-byte
//! payload (`T...`, 34 characters). Hex forms (`41...` with the prefix, or a
//! bare/`0x` 20-byte EVM form) are accepted on input.
//!
//! Inside typed-data hashing the address is the 20-byte body only; the
//! prefix byte never reaches the hash.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use alloy_primitives::{Address, B256, hex};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GasFreeError;

/// Network prefix byte of every TRON mainnet/testnet address.
pub const ADDRESS_PREFIX: u8 = 0x41;

/// A TRON address holding the 20-byte account body.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TronAddress(Address);

impl TronAddress {
    /// Wraps a 20-byte account body.
    #[must_use]
    pub const fn new(body: Address) -> Self {
        Self(body)
    }

    /// Builds an address from the low 20 bytes of a slice.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAddress`] if `body` is not 20 bytes long.
    pub fn from_body(body: &[u8]) -> Result<Self, GasFreeError> {
        if body.len() != 20 {
            return Err(GasFreeError::InvalidAddress(format!(
                "expected 20 address bytes, got {}",
                body.len()
            )));
        }
        Ok(Self(Address::from_slice(body)))
    }

    /// Returns the 20-byte body as an EVM address.
    #[must_use]
    pub const fn as_evm(&self) -> Address {
        self.0
    }

    /// Returns the 21-byte `0x41 || body` payload.
    #[must_use]
    pub fn to_prefixed_bytes(&self) -> [u8; 21] {
        let mut out = [0u8; 21];
        out[0] = ADDRESS_PREFIX;
        out[1..].copy_from_slice(self.0.as_slice());
        out
    }

    /// Returns the canonical Base58Check form (`T...`).
    #[must_use]
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_prefixed_bytes())
            .with_check()
            .into_string()
    }

    /// Returns the prefixed hex form (`41...`, 42 lowercase characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_prefixed_bytes())
    }

    /// Returns the body left-padded to a 32-byte word.
    #[must_use]
    pub fn into_word(self) -> B256 {
        self.0.into_word()
    }

    fn parse_base58(s: &str) -> Result<Self, GasFreeError> {
        let decoded = bs58::decode(s)
            .with_check(Some(ADDRESS_PREFIX))
            .into_vec()
            .map_err(|e| GasFreeError::InvalidAddress(format!("{s}: {e}")))?;
        if decoded.len() != 21 || decoded[0] != ADDRESS_PREFIX {
            return Err(GasFreeError::InvalidAddress(format!(
                "{s}: expected 21 prefixed bytes"
            )));
        }
        Self::from_body(&decoded[1..])
    }

    fn parse_hex(s: &str) -> Result<Self, GasFreeError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes =
            hex::decode(digits).map_err(|e| GasFreeError::InvalidAddress(format!("{s}: {e}")))?;
        match bytes.len() {
            21 if bytes[0] == ADDRESS_PREFIX => Self::from_body(&bytes[1..]),
            20 => Self::from_body(&bytes),
            _ => Err(GasFreeError::InvalidAddress(format!(
                "{s}: expected 41-prefixed or 20-byte hex"
            ))),
        }
    }
}

impl FromStr for TronAddress {
    type Err = GasFreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('T') {
            Self::parse_base58(s)
        } else {
            Self::parse_hex(s)
        }
    }
}

impl Display for TronAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl Debug for TronAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TronAddress({})", self.to_base58())
    }
}

impl From<Address> for TronAddress {
    fn from(body: Address) -> Self {
        Self(body)
    }
}

impl From<TronAddress> for Address {
    fn from(address: TronAddress) -> Self {
        address.0
    }
}

impl Serialize for TronAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
