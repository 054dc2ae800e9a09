//! `maxFee` selection.
//!
//! The first authorization executed through a proxy account also deploys it
//! and is charged the one-time activation fee on top of the transfer fee.
//! The relay enforces the schedule; the client only has to offer a large
//! enough `maxFee`.

use crate::amount::TokenAmount;
use crate::error::GasFreeError;
use crate::proto::{AccountSnapshot, AssetBalance, TokenConfig};

/// Activation fee assumed when the relay reports none (2 USDT).
pub const DEFAULT_ACTIVATE_FEE: u64 = 2_000_000;

/// Transfer fee assumed when the relay reports none (0.05 USDT).
pub const DEFAULT_TRANSFER_FEE: u64 = 50_000;

/// Fees charged for one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    /// One-time activation fee.
    pub activate_fee: TokenAmount,
    /// Per-transfer fee.
    pub transfer_fee: TokenAmount,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            activate_fee: TokenAmount::from(DEFAULT_ACTIVATE_FEE),
            transfer_fee: TokenAmount::from(DEFAULT_TRANSFER_FEE),
        }
    }
}

impl From<&TokenConfig> for FeeSchedule {
    fn from(token: &TokenConfig) -> Self {
        Self {
            activate_fee: token.activate_fee,
            transfer_fee: token.transfer_fee,
        }
    }
}

impl From<&AssetBalance> for FeeSchedule {
    fn from(asset: &AssetBalance) -> Self {
        Self {
            activate_fee: asset.activate_fee,
            transfer_fee: asset.transfer_fee,
        }
    }
}

impl FeeSchedule {
    /// Picks the most specific schedule available: the account's own asset
    /// entry, then the token listing, then the defaults.
    #[must_use]
    pub fn resolve(asset: Option<&AssetBalance>, token: Option<&TokenConfig>) -> Self {
        asset
            .map(Self::from)
            .or_else(|| token.map(Self::from))
            .unwrap_or_default()
    }

    /// Returns the `maxFee` to offer for an account in the given activation state.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAmount`] if the fee sum overflows.
    pub fn max_fee(&self, active: bool) -> Result<TokenAmount, GasFreeError> {
        if active {
            Ok(self.transfer_fee)
        } else {
            self.activate_fee.checked_add(self.transfer_fee)
        }
    }

    /// Returns the `maxFee` to offer for the account described by `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAmount`] if the fee sum overflows.
    pub fn max_fee_for(&self, snapshot: &AccountSnapshot) -> Result<TokenAmount, GasFreeError> {
        self.max_fee(snapshot.active)
    }

    /// Returns the proxy balance needed to move `value`: the value plus the
    /// worst-case fee for the activation state.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAmount`] if the sum overflows.
    pub fn required_balance(
        &self,
        value: TokenAmount,
        active: bool,
    ) -> Result<TokenAmount, GasFreeError> {
        value.checked_add(self.max_fee(active)?)
    }
}
