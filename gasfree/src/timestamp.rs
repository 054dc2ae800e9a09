//! Unix timestamps for authorization deadlines.
//!
//! A gas-free authorization expires at its `deadline`, a Unix time in
//! seconds. The core never rejects a deadline that has already passed;
//! the relay enforces expiry.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::time::{Duration, SystemTime};

/// A Unix timestamp representing seconds since the Unix epoch (1970-01-01T00:00:00Z).
///
/// # Serialization
///
/// Serialized as a JSON integer, the form the relay API expects. Both
/// integers and stringified integers are accepted when deserializing.
///
/// ```json
/// 1767225780
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq, Hash, Default)]
pub struct UnixTimestamp(u64);

impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for UnixTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SecsVisitor;

        impl Visitor<'_> for SecsVisitor {
            type Value = UnixTimestamp;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("a non-negative integer timestamp")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(UnixTimestamp(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                u64::try_from(v)
                    .map(UnixTimestamp)
                    .map_err(|_| E::custom("timestamp must be a non-negative integer"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse::<u64>()
                    .map(UnixTimestamp)
                    .map_err(|_| E::custom("timestamp must be a non-negative integer"))
            }
        }

        deserializer.deserialize_any(SecsVisitor)
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl Add<Duration> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self + rhs.as_secs()
    }
}

impl UnixTimestamp {
    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// # Panics
    ///
    /// Panics if the system clock is set to a time before the Unix epoch,
    /// which should never happen on properly configured systems.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("SystemTime before UNIX epoch?!?")
            .as_secs();
        Self(now)
    }

    /// Returns a deadline `secs` seconds from now.
    #[must_use]
    pub fn in_secs(secs: u64) -> Self {
        Self::now() + secs
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_number() {
        let ts = UnixTimestamp::from_secs(1_767_225_780);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1767225780");
    }

    #[test]
    fn accepts_stringified_integers() {
        let ts: UnixTimestamp = serde_json::from_str("\"1767225780\"").unwrap();
        assert_eq!(ts.as_secs(), 1_767_225_780);
        assert!(serde_json::from_str::<UnixTimestamp>("-1").is_err());
    }

    #[test]
    fn addition_saturates() {
        let ts = UnixTimestamp::from_secs(u64::MAX - 1) + 10;
        assert_eq!(ts.as_secs(), u64::MAX);
        assert_eq!((UnixTimestamp::from_secs(100) + Duration::from_secs(80)).as_secs(), 180);
    }
}
