#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for gas-free TRC-20 transfers on TRON.
//!
//! A gas-free transfer lets a user move tokens without holding TRX: the user
//! signs a `PermitTransfer` authorization, a relayer ("service provider")
//! executes it through the user's deterministic proxy account, and deducts
//! its fee from the transferred token.
//!
//! This crate is chain-math free. Hashing, signing and proxy address
//! derivation live in `gasfree-tron`; HTTP clients and flows live in
//! `gasfree-http`.
//!
//! # Modules
//!
//! - [`address`] - TRON address codec (Base58Check and hex)
//! - [`amount`] - `uint256` token amounts and human-readable conversion
//! - [`authorization`] - The signed intent and its signing domain
//! - [`fees`] - `maxFee` selection for active and inactive accounts
//! - [`ledger`] - Ledger collaborator trait
//! - [`networks`] - Built-in Nile and mainnet deployments
//! - [`proto`] - Relay API wire types
//! - [`relay`] - Relay collaborator trait
//! - [`tracker`] - Status tracking state machine
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod address;
pub mod amount;
pub mod authorization;
pub mod error;
pub mod fees;
pub mod ledger;
pub mod networks;
pub mod proto;
pub mod relay;
pub mod timestamp;
pub mod tracker;

pub use address::TronAddress;
pub use amount::TokenAmount;
pub use authorization::{SigningDomain, TransferAuthorization};
pub use error::GasFreeError;
pub use networks::NetworkConfig;
pub use timestamp::UnixTimestamp;
