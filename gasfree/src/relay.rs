//! The relay collaborator.
//!
//! Flows talk to the gas-free relay through [`RelayApi`]. The HTTP
//! implementation lives in `gasfree-http`; tests substitute in-memory fakes.

use std::future::Future;
use std::pin::Pin;

use crate::address::TronAddress;
use crate::error::GasFreeError;
use crate::proto::{
    AccountSnapshot, ServiceProvider, SubmitReceipt, SubmitRequest, TokenConfig, TransferStatus,
};

/// A boxed, `Send` future borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async access to the gas-free relay.
///
/// All methods return [`BoxFuture`] because the primary implementation
/// performs network I/O. A relay envelope with `code != 200` surfaces as
/// [`GasFreeError::RelayRejected`] (or [`GasFreeError::StaleNonce`])
/// converted into `Self::Error`.
pub trait RelayApi: Send + Sync {
    /// Transport error type. Protocol errors convert into it.
    type Error: std::error::Error + From<GasFreeError> + Send + Sync + 'static;

    /// Lists the tokens the relay accepts.
    fn tokens(&self) -> BoxFuture<'_, Result<Vec<TokenConfig>, Self::Error>>;

    /// Lists the active service providers.
    fn providers(&self) -> BoxFuture<'_, Result<Vec<ServiceProvider>, Self::Error>>;

    /// Fetches the proxy account state of `user`.
    fn account<'a>(
        &'a self,
        user: &'a TronAddress,
    ) -> BoxFuture<'a, Result<AccountSnapshot, Self::Error>>;

    /// Submits a signed authorization and returns its trace id.
    fn submit<'a>(
        &'a self,
        request: &'a SubmitRequest,
    ) -> BoxFuture<'a, Result<SubmitReceipt, Self::Error>>;

    /// Fetches the execution status of a submission.
    ///
    /// Returns `Ok(None)` when the relay has no record of `trace_id` yet.
    fn transfer_status<'a>(
        &'a self,
        trace_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<TransferStatus>, Self::Error>>;
}
