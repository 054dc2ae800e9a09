use serde::{Deserialize, Serialize};
use serde_with::{VecSkipError, serde_as};

use crate::address::TronAddress;
use crate::amount::TokenAmount;

/// Payload of `GET /{network}/api/v1/config/token/all`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenList {
    /// Supported tokens. Entries the client cannot parse are skipped.
    #[serde_as(as = "VecSkipError<_>")]
    pub tokens: Vec<TokenConfig>,
}

/// A token the relay accepts, with its fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenConfig {
    /// Ticker symbol, e.g. `USDT`.
    pub symbol: String,
    /// TRC-20 contract address.
    pub token_address: TronAddress,
    /// Number of decimals of the token.
    pub decimal: u32,
    /// One-time fee charged on the activating transfer.
    pub activate_fee: TokenAmount,
    /// Fee charged on every transfer.
    pub transfer_fee: TokenAmount,
    /// Smallest accepted transfer value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_transfer: Option<TokenAmount>,
    /// Largest accepted transfer value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_transfer: Option<TokenAmount>,
}

/// Payload of `GET /{network}/api/v1/config/provider/all`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderList {
    /// Active service providers. Entries the client cannot parse are skipped.
    #[serde_as(as = "VecSkipError<_>")]
    pub providers: Vec<ServiceProvider>,
}

/// A relayer that executes authorizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProvider {
    /// Display name.
    pub name: String,
    /// Address placed in the authorization's `serviceProvider` field.
    pub address: TronAddress,
    /// Operator website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Deadline and pending-transfer limits.
    pub config: ProviderLimits,
}

/// Limits a provider applies to incoming authorizations. Durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLimits {
    /// Shortest accepted `deadline - now`.
    pub min_deadline_duration: u64,
    /// Longest accepted `deadline - now`.
    pub max_deadline_duration: u64,
    /// Duration the provider suggests when the caller has no preference.
    pub default_deadline_duration: u64,
    /// Maximum number of unresolved authorizations per account.
    pub max_pending_transfer: u64,
}

impl ProviderLimits {
    /// Clamps a requested deadline duration into the accepted window.
    #[must_use]
    pub fn clamp_deadline(&self, requested: u64) -> u64 {
        requested.clamp(
            self.min_deadline_duration,
            self.max_deadline_duration.max(self.min_deadline_duration),
        )
    }
}

impl TokenList {
    /// Finds the configuration of a token contract.
    #[must_use]
    pub fn find(&self, token: &TronAddress) -> Option<&TokenConfig> {
        self.tokens.iter().find(|t| &t.token_address == token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_list_skips_malformed_entries() {
        let json = r#"{"tokens":[
            {"symbol":"USDT","tokenAddress":"TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf","decimal":6,
             "activateFee":2000000,"transferFee":50000,"minTransfer":1000000},
            {"symbol":"BROKEN","tokenAddress":"not-an-address","decimal":6,
             "activateFee":1,"transferFee":1}
        ]}"#;
        let list: TokenList = serde_json::from_str(json).unwrap();
        assert_eq!(list.tokens.len(), 1);
        let usdt = list
            .find(&"TXYZopYRdj2D9XRtbG411XZZ3kM5VkAeBf".parse().unwrap())
            .unwrap();
        assert_eq!(usdt.activate_fee, TokenAmount::from(2_000_000u64));
        assert_eq!(usdt.min_transfer, Some(TokenAmount::from(1_000_000u64)));
        assert_eq!(usdt.max_transfer, None);
    }

    #[test]
    fn provider_limits_clamp_deadlines() {
        let json = r#"{"providers":[{"name":"p1","address":"TKtWbdzEq5ss9vTS9kwRhBp5mXmBfBns3E",
            "config":{"minDeadlineDuration":60,"maxDeadlineDuration":600,
                      "defaultDeadlineDuration":180,"maxPendingTransfer":1}}]}"#;
        let list: ProviderList = serde_json::from_str(json).unwrap();
        let limits = list.providers[0].config;
        assert_eq!(limits.clamp_deadline(10), 60);
        assert_eq!(limits.clamp_deadline(180), 180);
        assert_eq!(limits.clamp_deadline(9_999), 600);
        assert_eq!(list.providers[0].website, None);
    }
}
