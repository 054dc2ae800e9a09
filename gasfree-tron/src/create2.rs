//! Counterfactual proxy account addresses.
//!
//! Each user's funds live in a beacon proxy that the controller deploys with
//! CREATE2 on first use. Its address is fixed in advance:
//!
//! ```text
//! salt         = pad32(user)
//! init_data    = selector("initialize(address)") || pad32(user)
//! init_code    = creation_code || abi.encode(beacon, init_data)
//! raw          = keccak(0x41 || controller || salt || keccak(init_code))
//! proxy        = 0x41 || raw[12..]
//! ```
//!
//! TRON's CREATE2 uses `0x41` where the EVM uses `0xff`.

use alloy_primitives::{B256, Bytes};
use alloy_sol_types::SolValue;
use gasfree::address::ADDRESS_PREFIX;
use gasfree::{NetworkConfig, TronAddress};

use crate::hash::{keccak, keccak_concat};

/// Signature of the proxy initializer.
pub const INITIALIZE_SIGNATURE: &str = "initialize(address)";

/// Prefix byte of the CREATE2 preimage on TRON.
pub const CREATE2_PREFIX: u8 = ADDRESS_PREFIX;

/// Returns the 4-byte selector of `initialize(address)` (`c4d66de8`).
#[must_use]
pub fn initialize_selector() -> [u8; 4] {
    let hash = keccak(INITIALIZE_SIGNATURE.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Returns the CREATE2 salt for `user`.
#[must_use]
pub fn salt_for(user: &TronAddress) -> B256 {
    user.into_word()
}

/// Returns the `initialize(user)` call data (36 bytes).
#[must_use]
pub fn initialize_call_data(user: &TronAddress) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&initialize_selector());
    data.extend_from_slice(salt_for(user).as_slice());
    data.into()
}

/// Returns the hash of the proxy init code deployed for `user`.
#[must_use]
pub fn init_code_hash(user: &TronAddress, beacon: &TronAddress, creation_code: &[u8]) -> B256 {
    let constructor_args = (beacon.as_evm(), initialize_call_data(user)).abi_encode_params();
    keccak_concat(&[creation_code, &constructor_args])
}

/// Derives the proxy account address of `user`.
///
/// Pure and total: no network access, same output for the same inputs.
#[must_use]
pub fn derive_proxy_address(
    user: &TronAddress,
    controller: &TronAddress,
    beacon: &TronAddress,
    creation_code: &[u8],
) -> TronAddress {
    let raw = keccak_concat(&[
        &[CREATE2_PREFIX],
        controller.as_evm().as_slice(),
        salt_for(user).as_slice(),
        init_code_hash(user, beacon, creation_code).as_slice(),
    ]);
    TronAddress::new(alloy_primitives::Address::from_word(raw))
}

/// Derives the proxy account address of `user` on a built-in deployment.
#[must_use]
pub fn proxy_address(network: &NetworkConfig, user: &TronAddress) -> TronAddress {
    derive_proxy_address(user, &network.controller, &network.beacon, network.creation_code)
}
