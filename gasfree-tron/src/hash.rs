//! Keccak-256 and 32-byte word packing.
//!
//! Every structural hash in the protocol is Keccak-256 over a concatenation
//! of 32-byte words:
//!
//! - addresses: the 20-byte body right-aligned, zero-padded on the left
//! - integers: big-endian, zero-padded on the left
//! - strings and byte strings: hashed first, the 32-byte digest is the word

use alloy_primitives::{B256, U256, keccak256};
use gasfree::{GasFreeError, TronAddress};

/// Keccak-256 of `bytes`.
#[must_use]
pub fn keccak(bytes: impl AsRef<[u8]>) -> B256 {
    keccak256(bytes)
}

/// Keccak-256 of the concatenation of `parts`, without an intermediate buffer per part.
#[must_use]
pub fn keccak_concat(parts: &[&[u8]]) -> B256 {
    let mut hasher = alloy_primitives::Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// Left-pads `bytes` with zeros to a 32-byte word.
///
/// # Errors
///
/// Returns [`GasFreeError::EncodingMismatch`] if `bytes` is longer than 32.
pub fn pad32(bytes: &[u8]) -> Result<B256, GasFreeError> {
    if bytes.len() > 32 {
        return Err(GasFreeError::EncodingMismatch(format!(
            "{} bytes do not fit a 32-byte word",
            bytes.len()
        )));
    }
    let mut word = B256::ZERO;
    word[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(word)
}

/// Encodes an address as a word.
#[must_use]
pub fn address_word(address: &TronAddress) -> B256 {
    address.into_word()
}

/// Encodes an unsigned integer as a big-endian word.
#[must_use]
pub fn uint_word(value: U256) -> B256 {
    B256::from(value)
}

/// Encodes a string as the hash of its UTF-8 bytes.
#[must_use]
pub fn string_word(value: &str) -> B256 {
    keccak(value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            keccak(b""),
            b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn concat_matches_single_buffer() {
        let joined = [b"19".as_slice(), b"01".as_slice()].concat();
        assert_eq!(keccak_concat(&[b"19".as_slice(), b"01".as_slice()]), keccak(joined));
    }

    #[test]
    fn words_are_left_padded() {
        assert_eq!(
            uint_word(U256::from(500_000u64)),
            b256!("000000000000000000000000000000000000000000000000000000000007a120")
        );
        let addr = TronAddress::new(address!("2c7536e3605d9c16a7a3d7b1898e529396a65c23"));
        assert_eq!(
            address_word(&addr),
            b256!("0000000000000000000000002c7536e3605d9c16a7a3d7b1898e529396a65c23")
        );
        assert_eq!(pad32(&[0xab]).unwrap()[31], 0xab);
        assert!(pad32(&[0u8; 33]).is_err());
    }
}
