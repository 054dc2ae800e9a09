#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Cryptographic core of gas-free TRON transfers.
//!
//! - [`hash`] - Keccak-256 and 32-byte word packing
//! - [`typed_data`] - EIP-712 style domain separator, struct hash and digest
//! - [`signer`] - Authorization signing and external-signer hash export
//! - [`create2`] - Counterfactual proxy account address derivation
//!
//! Everything here is synchronous and pure: no I/O and no shared state, so
//! every function may be called concurrently without locking.
//!
//! # Example
//!
//! ```
//! use gasfree::{NetworkConfig, TokenAmount, TransferAuthorization, UnixTimestamp};
//! use gasfree_tron::create2::proxy_address;
//! use gasfree_tron::signer::AuthorizationSigner;
//!
//! let nile = NetworkConfig::nile();
//! let signer = AuthorizationSigner::random();
//! let proxy = proxy_address(&nile, &signer.address());
//!
//! let auth = TransferAuthorization::new(
//!     nile.usdt,
//!     "TKtWbdzEq5ss9vTS9kwRhBp5mXmBfBns3E".parse().unwrap(),
//!     signer.address(),
//!     signer.address(),
//!     TokenAmount::from(1_000_000u64),
//! )
//! .with_max_fee(TokenAmount::from(2_050_000u64))
//! .with_deadline(UnixTimestamp::in_secs(180));
//!
//! let signature = signer.sign(&auth, &nile.signing_domain()).unwrap();
//! assert_eq!(signature.to_hex().len(), 130);
//! # let _ = proxy;
//! ```

pub mod create2;
pub mod hash;
pub mod signer;
pub mod typed_data;

pub use create2::{derive_proxy_address, proxy_address};
pub use signer::{
    AuthorizationSigner, ExternalSignerHashes, TransferSignature, raw_hash_for_external_signer,
    sign,
};
pub use typed_data::TypedDataHashes;
