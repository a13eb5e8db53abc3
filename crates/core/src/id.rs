//! Strongly-typed identifiers used across the audit domain.
//!
//! The host catalog hands out positive integer ids (posts, orders, users), so
//! every identifier here is an `i64` newtype. `i64` matches the `BIGINT`
//! columns of the audit log.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::AuditError;

/// Identifier of a catalog product (or variation).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of an order. Shop orders and external purchase orders share this space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

/// Identifier of the acting user. `0` is the unauthenticated guest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

/// Surrogate key of a persisted audit record, assigned by the store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = AuditError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|e| AuditError::invalid_id(format!("{}: {}", $name, e)))?;
                if value < 0 {
                    return Err(AuditError::invalid_id(format!(
                        "{}: negative id {}",
                        $name, value
                    )));
                }
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(ProductId, "ProductId");
impl_int_newtype!(OrderId, "OrderId");
impl_int_newtype!(UserId, "UserId");
impl_int_newtype!(RecordId, "RecordId");

impl UserId {
    /// The actor recorded for storefront changes made without a login.
    pub const GUEST: UserId = UserId(0);

    pub fn is_guest(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_integer_ids() {
        assert_eq!(" 42 ".parse::<ProductId>().unwrap(), ProductId::new(42));
        assert_eq!("7".parse::<OrderId>().unwrap().get(), 7);
    }

    #[test]
    fn rejects_negative_and_non_numeric_ids() {
        assert!(matches!("-1".parse::<ProductId>(), Err(AuditError::InvalidId(_))));
        assert!(matches!("abc".parse::<UserId>(), Err(AuditError::InvalidId(_))));
    }

    #[test]
    fn guest_is_user_zero() {
        assert!(UserId::GUEST.is_guest());
        assert!(!UserId::new(3).is_guest());
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&ProductId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
