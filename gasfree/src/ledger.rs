//! The ledger collaborator.
//!
//! Activation needs a few ordinary on-chain operations: reading a TRC-20
//! balance, sending a plain TRC-20 transfer to fund the proxy account, and
//! checking whether that transfer landed. [`LedgerClient`] abstracts them.

use crate::address::TronAddress;
use crate::amount::TokenAmount;
use crate::error::GasFreeError;

/// Result of an included ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxOutcome {
    /// Executed successfully.
    Success,
    /// Included but reverted; carries the receipt result (e.g. `REVERT`).
    Failed(String),
}

/// Async access to a TRON full node.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
    /// Transport error type. Protocol errors convert into it.
    type Error: std::error::Error + From<GasFreeError> + Send + Sync + 'static;

    /// Reads `balanceOf(owner)` on a TRC-20 contract.
    async fn token_balance(
        &self,
        token: &TronAddress,
        owner: &TronAddress,
    ) -> Result<TokenAmount, Self::Error>;

    /// Signs and broadcasts `transfer(to, amount)` from the client's own account.
    ///
    /// Returns the transaction id.
    async fn transfer_token(
        &self,
        token: &TronAddress,
        to: &TronAddress,
        amount: TokenAmount,
    ) -> Result<String, Self::Error>;

    /// Looks up a transaction; `None` until it is included in a block.
    async fn transaction_outcome(&self, tx_id: &str) -> Result<Option<TxOutcome>, Self::Error>;
}
