//! The `(p256dh, auth)` key pair a user-agent supplies with a push subscription.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors rejecting a candidate subscription key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The key string was empty.
    #[error("key cannot be empty")]
    Empty,
    /// The key did not decode as base64url without padding.
    #[error("key must be valid base64url: {0}")]
    InvalidEncoding(String),
}

fn validate_base64url(candidate: &str) -> Result<(), KeyError> {
    if candidate.is_empty() {
        return Err(KeyError::Empty);
    }
    URL_SAFE_NO_PAD
        .decode(candidate)
        .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;
    Ok(())
}

macro_rules! base64url_key {
    ($name:ident) => {
        /// A non-empty base64url-without-padding-decodable key string.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Validates and wraps a candidate key string.
            ///
            /// # Errors
            ///
            /// Returns [`KeyError`] if the string is empty or not valid base64url.
            pub fn parse(candidate: &str) -> Result<Self, KeyError> {
                validate_base64url(candidate)?;
                Ok(Self(candidate.to_string()))
            }

            /// Returns the key's string form.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

base64url_key!(P256dhKey);
base64url_key!(AuthKey);

/// The ECDH public key and authentication secret derived from a push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushKeys {
    /// ECDH public key used to derive the content-encryption key.
    pub p256dh: P256dhKey,
    /// Authentication secret used in the content-encryption key derivation.
    pub auth: AuthKey,
}

impl PushKeys {
    /// Parses both keys of a subscription's key pair.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if either key is invalid.
    pub fn parse(p256dh: &str, auth: &str) -> Result<Self, KeyError> {
        Ok(Self {
            p256dh: P256dhKey::parse(p256dh)?,
            auth: AuthKey::parse(auth)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_base64url() {
        assert!(P256dhKey::parse("BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM").is_ok());
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(P256dhKey::parse(""), Err(KeyError::Empty));
    }

    #[test]
    fn rejects_padded_base64() {
        assert!(matches!(
            AuthKey::parse("abc="),
            Err(KeyError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn push_keys_requires_both_valid() {
        assert!(PushKeys::parse("validbase64url", "").is_err());
    }
}
