//! Authorization signing.
//!
//! [`AuthorizationSigner`] signs the digest produced by
//! [`TypedDataHashes::compute`] with a secp256k1 key. Hardware-wallet flows
//! call [`raw_hash_for_external_signer`] instead, which exports the same
//! three hashes without touching a key.

use std::fmt::{Debug, Display, Formatter};

use alloy_primitives::{B256, Signature, hex};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use gasfree::{GasFreeError, SigningDomain, TransferAuthorization, TronAddress};
use serde::{Deserialize, Serialize};

use crate::typed_data::TypedDataHashes;

/// A recoverable secp256k1 signature in the 65-byte `r || s || v` layout,
/// with `v` in `{27, 28}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSignature(Signature);

impl TransferSignature {
    /// Encoded length in bytes.
    pub const LEN: usize = 65;

    /// Parses a 65-byte signature. `v` may be `0/1` or `27/28`.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidSignature`] if the length or recovery id is wrong.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GasFreeError> {
        if bytes.len() != Self::LEN {
            return Err(GasFreeError::InvalidSignature(format!(
                "expected {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }
        Signature::try_from(bytes)
            .map(Self)
            .map_err(|e| GasFreeError::InvalidSignature(e.to_string()))
    }

    /// Parses a hex signature, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidSignature`] for malformed hex or layout.
    pub fn from_hex(text: &str) -> Result<Self, GasFreeError> {
        let bytes = hex::decode(text.trim())
            .map_err(|e| GasFreeError::InvalidSignature(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the 65-byte encoding.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 65] {
        self.0.as_bytes()
    }

    /// Returns the encoding as lowercase hex without `0x`, the form the relay expects.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Recovers the address that signed `digest`.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidSignature`] if no public key recovers.
    pub fn recover(&self, digest: &B256) -> Result<TronAddress, GasFreeError> {
        self.0
            .recover_address_from_prehash(digest)
            .map(TronAddress::new)
            .map_err(|e| GasFreeError::InvalidSignature(e.to_string()))
    }
}

impl Display for TransferSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Signature> for TransferSignature {
    fn from(signature: Signature) -> Self {
        Self(signature)
    }
}

/// The hashes a hardware wallet needs to sign an authorization, as
/// lowercase hex without `0x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSignerHashes {
    /// Domain separator.
    pub domain_separator_hex: String,
    /// `PermitTransfer` struct hash.
    pub struct_hash_hex: String,
    /// Digest to sign directly.
    pub final_digest_hex: String,
}

impl From<TypedDataHashes> for ExternalSignerHashes {
    fn from(hashes: TypedDataHashes) -> Self {
        Self {
            domain_separator_hex: hex::encode(hashes.domain_separator),
            struct_hash_hex: hex::encode(hashes.struct_hash),
            final_digest_hex: hex::encode(hashes.digest),
        }
    }
}

/// Computes the hashes behind a signature without signing.
///
/// The digest is byte-identical to the one [`AuthorizationSigner::sign`] signs.
///
/// # Errors
///
/// Returns [`GasFreeError::EncodingMismatch`] if a schema and its values disagree.
pub fn raw_hash_for_external_signer(
    auth: &TransferAuthorization,
    domain: &SigningDomain,
) -> Result<ExternalSignerHashes, GasFreeError> {
    TypedDataHashes::compute(auth, domain).map(ExternalSignerHashes::from)
}

/// Signs `auth` under `domain` with a hex private key.
///
/// # Errors
///
/// Returns [`GasFreeError::InvalidKey`] if the key is malformed.
pub fn sign(
    private_key: &str,
    auth: &TransferAuthorization,
    domain: &SigningDomain,
) -> Result<TransferSignature, GasFreeError> {
    AuthorizationSigner::from_hex(private_key)?.sign(auth, domain)
}

/// Recovers the address that signed `auth` under `domain`.
///
/// # Errors
///
/// Returns [`GasFreeError::InvalidSignature`] if no key recovers.
pub fn recover_authorizer(
    signature: &TransferSignature,
    auth: &TransferAuthorization,
    domain: &SigningDomain,
) -> Result<TronAddress, GasFreeError> {
    let hashes = TypedDataHashes::compute(auth, domain)?;
    signature.recover(&hashes.digest)
}

/// A local secp256k1 key that signs gas-free authorizations.
///
/// The same key controls the user's TRON account; its address is the
/// authorization's `user`.
pub struct AuthorizationSigner {
    inner: PrivateKeySigner,
}

impl Debug for AuthorizationSigner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl AuthorizationSigner {
    /// Generates a fresh random key.
    #[must_use]
    pub fn random() -> Self {
        Self {
            inner: PrivateKeySigner::random(),
        }
    }

    /// Loads a key from 64 hex characters, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidKey`] for malformed hex, a wrong length,
    /// or a scalar outside `[1, n)`.
    pub fn from_hex(private_key: &str) -> Result<Self, GasFreeError> {
        let bytes = hex::decode(private_key.trim())
            .map_err(|e| GasFreeError::InvalidKey(format!("not hex: {e}")))?;
        if bytes.len() != 32 {
            return Err(GasFreeError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        Self::from_bytes(&B256::from_slice(&bytes))
    }

    /// Loads a key from its 32-byte scalar.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidKey`] if the scalar is zero or not below the curve order.
    pub fn from_bytes(key: &B256) -> Result<Self, GasFreeError> {
        PrivateKeySigner::from_bytes(key)
            .map(|inner| Self { inner })
            .map_err(|_| GasFreeError::InvalidKey("scalar out of range".to_owned()))
    }

    /// Returns the TRON address controlled by this key.
    #[must_use]
    pub fn address(&self) -> TronAddress {
        TronAddress::new(self.inner.address())
    }

    /// Exports the private key as hex without `0x`.
    #[must_use]
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.inner.to_bytes())
    }

    /// Signs a precomputed 32-byte digest.
    ///
    /// Also used for TRON transaction ids, which are signed as-is.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidKey`] if the signing backend fails.
    pub fn sign_digest(&self, digest: &B256) -> Result<TransferSignature, GasFreeError> {
        self.inner
            .sign_hash_sync(digest)
            .map(TransferSignature)
            .map_err(|e| GasFreeError::InvalidKey(e.to_string()))
    }

    /// Signs `auth` under `domain`.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::EncodingMismatch`] if hashing fails or
    /// [`GasFreeError::InvalidKey`] if signing fails.
    pub fn sign(
        &self,
        auth: &TransferAuthorization,
        domain: &SigningDomain,
    ) -> Result<TransferSignature, GasFreeError> {
        let hashes = TypedDataHashes::compute(auth, domain)?;
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            user = %auth.user,
            nonce = auth.nonce,
            digest = %hashes.digest,
            "signing transfer authorization"
        );
        self.sign_digest(&hashes.digest)
    }
}
