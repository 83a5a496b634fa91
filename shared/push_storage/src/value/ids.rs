//! Opaque positive 64-bit identifiers for the push domain's aggregates.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when an identifier string does not parse to a positive integer.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("identifier must be a positive integer, got {0:?}")]
pub struct InvalidIdError(pub String);

macro_rules! opaque_id {
    ($name:ident) => {
        /// Opaque positive 64-bit identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Constructs an identifier from a raw value.
            ///
            /// # Errors
            ///
            /// Returns [`InvalidIdError`] if `value` is zero.
            pub fn new(value: u64) -> Result<Self, InvalidIdError> {
                if value == 0 {
                    return Err(InvalidIdError(value.to_string()));
                }
                Ok(Self(value))
            }

            /// Returns the raw numeric value.
            #[must_use]
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw: u64 = s.parse().map_err(|_| InvalidIdError(s.to_string()))?;
                Self::new(raw)
            }
        }
    };
}

opaque_id!(SubscriptionId);
opaque_id!(JobId);
opaque_id!(LogId);
opaque_id!(UserId);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_through_string_form() {
        let id = JobId::new(42).unwrap();
        let parsed = JobId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_zero() {
        assert!(JobId::new(0).is_err());
    }

    #[test]
    fn rejects_non_numeric_strings() {
        assert!(JobId::from_str("not-a-number").is_err());
        assert!(JobId::from_str("-1").is_err());
        assert!(JobId::from_str("").is_err());
    }
}
