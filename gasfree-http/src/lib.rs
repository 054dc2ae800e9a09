#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP clients and flows for gas-free TRC-20 transfers.
//!
//! Implements the collaborator traits of the `gasfree` crate over HTTP and
//! composes them into end-to-end transfer and activation flows.
//!
//! # Modules
//!
//! - [`auth`] - HMAC API key request signing
//! - [`client`] - Relay API client
//! - [`error`] - Transport error types
//! - [`flow`] - Transfer and activation flows
//! - [`poll`] - Status polling for relay submissions and ledger transactions
//! - [`trongrid`] - TronGrid ledger client
//!
//! # Feature Flags
//!
//! - `telemetry` - Emits tracing spans and events for relay calls and flows

pub mod auth;
pub mod client;
pub mod error;
pub mod flow;
pub mod poll;
pub mod trongrid;

pub use auth::{ApiKeyAuth, AuthProvider};
pub use client::{HttpRelayClient, RelayConfig};
pub use error::RelayError;
pub use flow::{Activation, GasFreeFlow, TransferRequest};
pub use poll::{PollPolicy, TransferReport, poll_transfer, wait_for_ledger_tx};
pub use trongrid::TronGridClient;
