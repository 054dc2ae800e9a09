//! EIP-712 style typed-data encoding.
//!
//! A struct is described by a [`StructType`]: its name and an ordered list
//! of typed fields. Field order is part of the hashing contract. Values are
//! a closed set of [`FieldValue`] variants, and every value is checked
//! against its declared [`FieldType`] before it is encoded.
//!
//! ```text
//! typeHash        = keccak("Name(type1 name1,type2 name2,...)")
//! hashStruct(s)   = keccak(typeHash || word(v1) || word(v2) || ...)
//! signing digest  = keccak(0x19 0x01 || domainSeparator || hashStruct(message))
//! ```

use alloy_primitives::{B256, U256};
use gasfree::{GasFreeError, SigningDomain, TransferAuthorization, TronAddress};

use crate::hash::{address_word, keccak, keccak_concat, string_word, uint_word};

/// Two-byte prefix marking a structured-data digest.
pub const STRUCTURED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Solidity type of a struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `address`, encoded as a left-padded 20-byte body.
    Address,
    /// `uint256`, encoded big-endian.
    Uint256,
    /// `string`, encoded as the hash of its UTF-8 bytes.
    String,
}

impl FieldType {
    /// Returns the Solidity type name used in type strings.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Uint256 => "uint256",
            Self::String => "string",
        }
    }
}

/// A named, typed struct member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Member name.
    pub name: &'static str,
    /// Member type.
    pub ty: FieldType,
}

impl Field {
    const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// A struct schema: a name and ordered fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructType {
    /// Struct name.
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [Field],
}

/// `EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)`.
pub const EIP712_DOMAIN: StructType = StructType {
    name: "EIP712Domain",
    fields: &[
        Field::new("name", FieldType::String),
        Field::new("version", FieldType::String),
        Field::new("chainId", FieldType::Uint256),
        Field::new("verifyingContract", FieldType::Address),
    ],
};

/// The gas-free `PermitTransfer` struct.
pub const PERMIT_TRANSFER: StructType = StructType {
    name: "PermitTransfer",
    fields: &[
        Field::new("token", FieldType::Address),
        Field::new("serviceProvider", FieldType::Address),
        Field::new("user", FieldType::Address),
        Field::new("receiver", FieldType::Address),
        Field::new("value", FieldType::Uint256),
        Field::new("maxFee", FieldType::Uint256),
        Field::new("deadline", FieldType::Uint256),
        Field::new("version", FieldType::Uint256),
        Field::new("nonce", FieldType::Uint256),
    ],
};

/// A value for one struct member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// An `address` value.
    Address(TronAddress),
    /// A `uint256` value.
    Uint256(U256),
    /// A `string` value.
    Str(&'a str),
}

impl FieldValue<'_> {
    /// Returns the type this value encodes as.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Address(_) => FieldType::Address,
            Self::Uint256(_) => FieldType::Uint256,
            Self::Str(_) => FieldType::String,
        }
    }

    /// Encodes the value as a 32-byte word.
    #[must_use]
    pub fn encode(&self) -> B256 {
        match self {
            Self::Address(address) => address_word(address),
            Self::Uint256(value) => uint_word(*value),
            Self::Str(value) => string_word(value),
        }
    }
}

impl StructType {
    /// Returns the canonical type string, e.g. `Name(address a,uint256 b)`.
    #[must_use]
    pub fn encode_type(&self) -> String {
        let members = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.ty.type_name(), f.name))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({members})", self.name)
    }

    /// Returns `keccak(encode_type())`.
    #[must_use]
    pub fn type_hash(&self) -> B256 {
        keccak(self.encode_type().as_bytes())
    }

    /// Hashes a struct instance.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::EncodingMismatch`] if `values` does not supply
    /// exactly one value of the declared type per field, in order.
    pub fn hash_struct(&self, values: &[FieldValue<'_>]) -> Result<B256, GasFreeError> {
        if values.len() != self.fields.len() {
            return Err(GasFreeError::EncodingMismatch(format!(
                "{} expects {} fields, got {}",
                self.name,
                self.fields.len(),
                values.len()
            )));
        }
        let mut encoded = Vec::with_capacity(32 * (values.len() + 1));
        encoded.extend_from_slice(self.type_hash().as_slice());
        for (field, value) in self.fields.iter().zip(values) {
            if value.field_type() != field.ty {
                return Err(GasFreeError::EncodingMismatch(format!(
                    "{}.{} is {}, got {}",
                    self.name,
                    field.name,
                    field.ty.type_name(),
                    value.field_type().type_name()
                )));
            }
            encoded.extend_from_slice(value.encode().as_slice());
        }
        Ok(keccak(&encoded))
    }
}

/// Values of a signing domain, in [`EIP712_DOMAIN`] order.
#[must_use]
pub fn domain_values(domain: &SigningDomain) -> [FieldValue<'_>; 4] {
    [
        FieldValue::Str(&domain.name),
        FieldValue::Str(&domain.version),
        FieldValue::Uint256(U256::from(domain.chain_id)),
        FieldValue::Address(domain.verifying_contract),
    ]
}

/// Values of an authorization, in [`PERMIT_TRANSFER`] order.
#[must_use]
pub fn permit_values(auth: &TransferAuthorization) -> [FieldValue<'static>; 9] {
    [
        FieldValue::Address(auth.token),
        FieldValue::Address(auth.service_provider),
        FieldValue::Address(auth.user),
        FieldValue::Address(auth.receiver),
        FieldValue::Uint256(auth.value.as_u256()),
        FieldValue::Uint256(auth.max_fee.as_u256()),
        FieldValue::Uint256(U256::from(auth.deadline.as_secs())),
        FieldValue::Uint256(U256::from(auth.version)),
        FieldValue::Uint256(U256::from(auth.nonce)),
    ]
}

/// Computes the domain separator.
///
/// # Errors
///
/// Returns [`GasFreeError::EncodingMismatch`] if the domain schema and
/// values disagree.
pub fn domain_separator(domain: &SigningDomain) -> Result<B256, GasFreeError> {
    EIP712_DOMAIN.hash_struct(&domain_values(domain))
}

/// Computes the `PermitTransfer` struct hash.
///
/// # Errors
///
/// Returns [`GasFreeError::EncodingMismatch`] if the schema and values disagree.
pub fn struct_hash(auth: &TransferAuthorization) -> Result<B256, GasFreeError> {
    PERMIT_TRANSFER.hash_struct(&permit_values(auth))
}

/// Combines a domain separator and struct hash into the digest that is signed.
#[must_use]
pub fn signing_digest(domain_separator: &B256, struct_hash: &B256) -> B256 {
    keccak_concat(&[
        STRUCTURED_DATA_PREFIX.as_slice(),
        domain_separator.as_slice(),
        struct_hash.as_slice(),
    ])
}

/// The three hashes behind one signature.
///
/// Produced by [`TypedDataHashes::compute`], the only place the digest is
/// assembled. Signing and external-signer export both go through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedDataHashes {
    /// Hash of the signing domain.
    pub domain_separator: B256,
    /// Hash of the authorization.
    pub struct_hash: B256,
    /// `keccak(0x1901 || domain_separator || struct_hash)`.
    pub digest: B256,
}

impl TypedDataHashes {
    /// Hashes an authorization under a domain.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::EncodingMismatch`] if a schema and its values disagree.
    pub fn compute(
        auth: &TransferAuthorization,
        domain: &SigningDomain,
    ) -> Result<Self, GasFreeError> {
        let domain_separator = domain_separator(domain)?;
        let struct_hash = struct_hash(auth)?;
        Ok(Self {
            domain_separator,
            struct_hash,
            digest: signing_digest(&domain_separator, &struct_hash),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloy_primitives::{address, b256};
    use alloy_sol_types::{SolStruct, eip712_domain, sol};
    use gasfree::{NetworkConfig, TokenAmount, UnixTimestamp};
    use rand::{RngExt, rng};

    sol! {
        struct PermitTransfer {
            address token;
            address serviceProvider;
            address user;
            address receiver;
            uint256 value;
            uint256 maxFee;
            uint256 deadline;
            uint256 version;
            uint256 nonce;
        }
    }

    /// The fixed authorization behind the pinned vectors.
    pub(crate) fn fixture(nonce: u64) -> TransferAuthorization {
        let user = TronAddress::new(address!("2c7536e3605d9c16a7a3d7b1898e529396a65c23"));
        TransferAuthorization::new(
            NetworkConfig::nile().usdt,
            TronAddress::new(address!("6ccdddd93829cee7ad52c2abf2c6866dee8381ab")),
            user,
            user,
            TokenAmount::from(500_000u64),
        )
        .with_max_fee(TokenAmount::from(2_050_000u64))
        .with_deadline(UnixTimestamp::from_secs(1_767_225_780))
        .with_nonce(nonce)
    }

    fn alloy_digest(auth: &TransferAuthorization, domain: &SigningDomain) -> B256 {
        let permit = PermitTransfer {
            token: auth.token.as_evm(),
            serviceProvider: auth.service_provider.as_evm(),
            user: auth.user.as_evm(),
            receiver: auth.receiver.as_evm(),
            value: auth.value.as_u256(),
            maxFee: auth.max_fee.as_u256(),
            deadline: U256::from(auth.deadline.as_secs()),
            version: U256::from(auth.version),
            nonce: U256::from(auth.nonce),
        };
        let alloy_domain = eip712_domain! {
            name: domain.name.clone(),
            version: domain.version.clone(),
            chain_id: domain.chain_id,
            verifying_contract: domain.verifying_contract.as_evm(),
        };
        permit.eip712_signing_hash(&alloy_domain)
    }

    fn random_address() -> TronAddress {
        let body: [u8; 20] = rng().random();
        TronAddress::from_body(&body).unwrap()
    }

    fn random_amount() -> TokenAmount {
        let bytes: [u8; 32] = rng().random();
        TokenAmount::new(U256::from_be_bytes(bytes))
    }

    #[test]
    fn type_strings_are_canonical() {
        assert_eq!(
            EIP712_DOMAIN.encode_type(),
            "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)"
        );
        assert_eq!(
            PERMIT_TRANSFER.encode_type(),
            "PermitTransfer(address token,address serviceProvider,address user,address receiver,\
             uint256 value,uint256 maxFee,uint256 deadline,uint256 version,uint256 nonce)"
        );
        assert_eq!(
            EIP712_DOMAIN.type_hash(),
            b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f")
        );
        assert_eq!(
            PERMIT_TRANSFER.type_hash(),
            b256!("7152a81926d9e798ca737da749154c32625b4ff2ffa7b4fe94e46d745c5202f4")
        );
    }

    #[test]
    fn nile_domain_separator() {
        assert_eq!(
            domain_separator(&NetworkConfig::nile().signing_domain()).unwrap(),
            b256!("31a0a46f427dd040c91835228e4555951bde0a894cae6239869bb680ebc6ebea")
        );
    }

    #[test]
    fn mainnet_domain_separator() {
        assert_eq!(
            domain_separator(&NetworkConfig::mainnet().signing_domain()).unwrap(),
            b256!("82f2b33881ada15cfdfa98b393db0e6f80fc9a27a4883ad62943ec5da825c9e8")
        );
    }

    #[test]
    fn reference_struct_hashes_and_digests() {
        let domain = NetworkConfig::nile().signing_domain();

        let first = TypedDataHashes::compute(&fixture(0), &domain).unwrap();
        assert_eq!(
            first.struct_hash,
            b256!("1297959a5563366300568a44650e026261935dc3bece5bff69e47b2782509184")
        );
        assert_eq!(
            first.digest,
            b256!("310c61f380c534356175cfc1562bd69436674af558453baf809372e0f75f6964")
        );

        let second = TypedDataHashes::compute(&fixture(1), &domain).unwrap();
        assert_eq!(
            second.struct_hash,
            b256!("f75425bb90249d93b63b245727041eaf5120530f8724feb692677c57666f55b7")
        );
        assert_eq!(
            second.digest,
            b256!("000bc8ec355bebf59b51a665c5ba876acb1c659c92212a85958c1f9137046759")
        );
        assert_eq!(first.domain_separator, second.domain_separator);
    }

    #[test]
    fn value_of_wrong_type_is_rejected() {
        let mut values = permit_values(&fixture(0));
        values[4] = FieldValue::Str("500000");
        let err = PERMIT_TRANSFER.hash_struct(&values).unwrap_err();
        assert_eq!(
            err,
            GasFreeError::EncodingMismatch("PermitTransfer.value is uint256, got string".into())
        );
    }

    #[test]
    fn missing_values_are_rejected() {
        let values = permit_values(&fixture(0));
        assert!(matches!(
            PERMIT_TRANSFER.hash_struct(&values[..8]),
            Err(GasFreeError::EncodingMismatch(_))
        ));
    }

    #[test]
    fn agrees_with_sol_macro_on_fixture() {
        for network in [NetworkConfig::nile(), NetworkConfig::mainnet()] {
            let domain = network.signing_domain();
            let auth = fixture(0);
            assert_eq!(
                TypedDataHashes::compute(&auth, &domain).unwrap().digest,
                alloy_digest(&auth, &domain)
            );
        }
    }

    #[test]
    fn agrees_with_sol_macro_on_random_inputs() {
        for _ in 0..128 {
            let auth = TransferAuthorization::new(
                random_address(),
                random_address(),
                random_address(),
                random_address(),
                random_amount(),
            )
            .with_max_fee(random_amount())
            .with_deadline(UnixTimestamp::from_secs(rng().random()))
            .with_nonce(rng().random());
            let domain = SigningDomain::new(rng().random(), random_address());
            assert_eq!(
                TypedDataHashes::compute(&auth, &domain).unwrap().digest,
                alloy_digest(&auth, &domain)
            );
        }
    }
}
