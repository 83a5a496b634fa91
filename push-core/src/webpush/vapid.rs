//! VAPID (RFC 8292) request authorization.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use p256::ecdsa::{signature::Signer, Signature, SigningKey, VerifyingKey};
use serde::Serialize;
use thiserror::Error;

/// Errors producing a VAPID authorization.
#[derive(Debug, Error)]
pub enum VapidError {
    /// The claims could not be serialized to JSON.
    #[error("failed to serialize VAPID claims: {0}")]
    Serialization(String),
    /// The endpoint's origin could not be determined.
    #[error("invalid push endpoint: {0}")]
    InvalidEndpoint(String),
}

/// The `Authorization` and `Crypto-Key` header values a VAPID-authenticated request needs.
#[derive(Debug, Clone)]
pub struct VapidAuthorization {
    /// Value of the `Authorization` header: `vapid t=<jwt>, k=<public key>`.
    pub authorization_header: String,
    /// `p256ecdsa` public key component of the `Crypto-Key` header.
    pub public_key_b64: String,
}

/// Signs VAPID-authenticated Web Push requests. Implementations are consumed behind
/// `Arc<dyn VapidSigner>`; a KMS-backed signer is a drop-in replacement for
/// [`EcdsaVapidSigner`] that delegates `sign` to a remote key instead of a local one.
pub trait VapidSigner: Send + Sync {
    /// The uncompressed SEC1 public key, base64url-encoded, served to clients at
    /// `GET /api/push/vapid-public-key`.
    fn public_key(&self) -> &str;

    /// Produces the authorization for a request to a push service whose endpoint has origin
    /// `endpoint_origin` (e.g. `https://fcm.googleapis.com`), identifying this application
    /// server as `subject` (a `mailto:` or `https:` contact URI).
    fn sign(&self, endpoint_origin: &str, subject: &str) -> Result<VapidAuthorization, VapidError>;
}

/// JWT expiry, per RFC 8292 recommendation of no more than 24 hours.
const JWT_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Serialize)]
struct Claims<'a> {
    aud: &'a str,
    exp: i64,
    sub: &'a str,
}

/// Reference [`VapidSigner`]: a local P-256 keypair, no KMS or other remote signer involved.
pub struct EcdsaVapidSigner {
    signing_key: SigningKey,
    public_key_b64: String,
}

impl EcdsaVapidSigner {
    /// Generates a fresh P-256 keypair.
    #[must_use]
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self::from_signing_key(signing_key)
    }

    /// Builds a signer from an existing P-256 private key's raw 32-byte scalar.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw_scalar` is not a valid P-256 private key.
    pub fn from_raw_private_key(raw_scalar: &[u8]) -> Result<Self, VapidError> {
        let signing_key = SigningKey::from_slice(raw_scalar)
            .map_err(|e| VapidError::Serialization(e.to_string()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key: VerifyingKey = *signing_key.verifying_key();
        let encoded_point = verifying_key.to_encoded_point(false);
        let public_key_b64 = URL_SAFE_NO_PAD.encode(encoded_point.as_bytes());
        Self {
            signing_key,
            public_key_b64,
        }
    }
}

impl VapidSigner for EcdsaVapidSigner {
    fn public_key(&self) -> &str {
        &self.public_key_b64
    }

    fn sign(&self, endpoint_origin: &str, subject: &str) -> Result<VapidAuthorization, VapidError> {
        let exp = chrono::Utc::now().timestamp() + JWT_TTL_SECONDS;
        let claims = Claims {
            aud: endpoint_origin,
            exp,
            sub: subject,
        };

        let header_b64 = URL_SAFE_NO_PAD.encode(br#"{"typ":"JWT","alg":"ES256"}"#);
        let claims_json = serde_json::to_vec(&claims)
            .map_err(|e| VapidError::Serialization(e.to_string()))?;
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims_json);

        let signing_input = format!("{header_b64}.{claims_b64}");
        let signature: Signature = self.signing_key.sign(signing_input.as_bytes());
        let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

        let jwt = format!("{signing_input}.{signature_b64}");

        Ok(VapidAuthorization {
            authorization_header: format!("vapid t={jwt}, k={}", self.public_key_b64),
            public_key_b64: self.public_key_b64.clone(),
        })
    }
}

/// Extracts the scheme+host(+port) origin from an absolute endpoint URL, the `aud` claim VAPID
/// requires.
///
/// # Errors
///
/// Returns [`VapidError::InvalidEndpoint`] if `endpoint` does not parse or has no host.
pub fn endpoint_origin(endpoint: &str) -> Result<String, VapidError> {
    let url = url::Url::parse(endpoint).map_err(|e| VapidError::InvalidEndpoint(e.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| VapidError::InvalidEndpoint("missing host".to_string()))?;
    Ok(match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_strips_path_and_query() {
        let origin = endpoint_origin("https://fcm.googleapis.com/fcm/send/ABC?x=1").unwrap();
        assert_eq!(origin, "https://fcm.googleapis.com");
    }

    #[test]
    fn sign_produces_three_part_jwt_and_matching_public_key() {
        let signer = EcdsaVapidSigner::generate();
        let auth = signer.sign("https://fcm.googleapis.com", "mailto:a@b.com").unwrap();

        assert!(auth.authorization_header.starts_with("vapid t="));
        assert!(auth.authorization_header.contains(&format!("k={}", signer.public_key())));

        let jwt_part = auth
            .authorization_header
            .strip_prefix("vapid t=")
            .unwrap()
            .split(", k=")
            .next()
            .unwrap();
        assert_eq!(jwt_part.split('.').count(), 3);
    }

    #[test]
    fn two_signers_produce_different_public_keys() {
        let a = EcdsaVapidSigner::generate();
        let b = EcdsaVapidSigner::generate();
        assert_ne!(a.public_key(), b.public_key());
    }
}
