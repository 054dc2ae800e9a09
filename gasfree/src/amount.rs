//! Token amounts in the smallest on-chain unit.
//!
//! [`TokenAmount`] wraps a `uint256` so values, fees, balances and limits
//! all share one arbitrary-width type. Conversion to and from human-readable
//! decimals (e.g. `"1.5"` USDT with 6 decimals) goes through [`rust_decimal`].
//!
//! # Serialization
//!
//! The relay expects amounts as JSON numbers. Values that fit in a `u64` are
//! written as numbers; anything wider is written as a decimal string so no
//! digit is ever lost. Deserialization accepts both forms.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GasFreeError;

/// A non-negative integer amount of token base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// The zero amount.
    pub const ZERO: Self = Self(U256::ZERO);

    /// Wraps a raw `uint256`.
    #[must_use]
    pub const fn new(value: U256) -> Self {
        Self(value)
    }

    /// Returns the raw `uint256`.
    #[must_use]
    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Adds two amounts.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAmount`] if the sum overflows 256 bits.
    pub fn checked_add(self, rhs: Self) -> Result<Self, GasFreeError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or_else(|| GasFreeError::InvalidAmount(format!("{self} + {rhs} overflows uint256")))
    }

    /// Subtracts `rhs`, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Parses a human-readable decimal (e.g. `"12.5"`) into base units.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAmount`] if the text is not a decimal,
    /// is negative, or has more fractional digits than `decimals`.
    pub fn from_human(text: &str, decimals: u32) -> Result<Self, GasFreeError> {
        let value = Decimal::from_str(text.trim())
            .map_err(|e| GasFreeError::InvalidAmount(format!("{text}: {e}")))?;
        Self::from_decimal(value, decimals)
    }

    /// Scales a decimal by `10^decimals` into base units.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAmount`] for negative values or values
    /// with more fractional digits than `decimals`.
    pub fn from_decimal(value: Decimal, decimals: u32) -> Result<Self, GasFreeError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(GasFreeError::InvalidAmount(format!("{value} is negative")));
        }
        let value = value.normalize();
        let scale = value.scale();
        if scale > decimals {
            return Err(GasFreeError::InvalidAmount(format!(
                "{value} has more than {decimals} fractional digits"
            )));
        }
        let mantissa = u128::try_from(value.mantissa())
            .map_err(|_| GasFreeError::InvalidAmount(format!("{value} is negative")))?;
        let factor = U256::from(10u8).pow(U256::from(decimals - scale));
        U256::from(mantissa)
            .checked_mul(factor)
            .map(Self)
            .ok_or_else(|| GasFreeError::InvalidAmount(format!("{value} overflows uint256")))
    }

    /// Converts base units into a human-readable decimal.
    ///
    /// # Errors
    ///
    /// Returns [`GasFreeError::InvalidAmount`] if the value exceeds the
    /// 96-bit mantissa of [`Decimal`] or `decimals` exceeds its scale limit.
    pub fn to_decimal(&self, decimals: u32) -> Result<Decimal, GasFreeError> {
        let raw = i128::try_from(self.0)
            .map_err(|_| GasFreeError::InvalidAmount(format!("{self} is too large for Decimal")))?;
        Decimal::try_from_i128_with_scale(raw, decimals)
            .map(|d| d.normalize())
            .map_err(|e| GasFreeError::InvalidAmount(format!("{self}: {e}")))
    }
}

impl From<u64> for TokenAmount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<u128> for TokenAmount {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for TokenAmount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl From<TokenAmount> for U256 {
    fn from(value: TokenAmount) -> Self {
        value.0
    }
}

impl TryFrom<i64> for TokenAmount {
    type Error = GasFreeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self::from)
            .map_err(|_| GasFreeError::InvalidAmount(format!("{value} is negative")))
    }
}

impl FromStr for TokenAmount {
    type Err = GasFreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(GasFreeError::InvalidAmount(format!("{s} is negative")));
        }
        U256::from_str_radix(s, 10)
            .map(Self)
            .map_err(|e| GasFreeError::InvalidAmount(format!("{s}: {e}")))
    }
}

impl Display for TokenAmount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(self.0) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("a non-negative integer or decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TokenAmount::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(TokenAmount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        TokenAmount::try_from(v).map_err(E::custom)
    }

    #[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        // Only integral values below 2^53 survive a float round trip.
        if v >= 0.0 && v.fract() == 0.0 && v < 9_007_199_254_740_992.0 {
            Ok(TokenAmount::from(v as u64))
        } else {
            Err(E::custom(format!("invalid amount: {v}")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}
