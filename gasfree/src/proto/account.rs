use serde::{Deserialize, Serialize};

use crate::address::TronAddress;
use crate::amount::TokenAmount;

/// Payload of `GET /{network}/api/v1/address/{accountAddress}`.
///
/// The relay's view of a user's proxy account. Read it immediately before
/// signing: `nonce` is only valid until the next authorization executes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    /// The user's own address.
    pub account_address: TronAddress,
    /// The user's proxy account address.
    pub gas_free_address: TronAddress,
    /// Whether the proxy account has been deployed and initialized.
    pub active: bool,
    /// Nonce the next authorization must carry.
    pub nonce: u64,
    /// Whether the relay currently accepts submissions for this account.
    pub allow_submit: bool,
    /// Per-token balances held by the proxy account.
    #[serde(default)]
    pub assets: Vec<AssetBalance>,
}

impl AccountSnapshot {
    /// Finds the balance entry of a token, matching by address when the relay
    /// reports one and by symbol otherwise.
    #[must_use]
    pub fn asset(&self, token: &TronAddress, symbol: Option<&str>) -> Option<&AssetBalance> {
        self.assets.iter().find(|a| match a.token_address {
            Some(address) => &address == token,
            None => symbol.is_some_and(|s| a.token_symbol.eq_ignore_ascii_case(s)),
        })
    }
}

/// Balance and fee schedule of one token in a proxy account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBalance {
    /// Ticker symbol.
    pub token_symbol: String,
    /// Token contract, when the relay includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<TronAddress>,
    /// Spendable balance.
    pub available: TokenAmount,
    /// Balance locked by unresolved authorizations.
    pub frozen: TokenAmount,
    /// Activation fee for this account.
    pub activate_fee: TokenAmount,
    /// Per-transfer fee for this account.
    pub transfer_fee: TokenAmount,
}
