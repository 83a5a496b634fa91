//! RFC 8291 `aes128gcm` payload encryption to a subscription's `(p256dh, auth)` pair.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes128Gcm, KeyInit};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hkdf::Hkdf;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::rand_core::OsRng;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::PublicKey;
use sha2::Sha256;
use thiserror::Error;

const SALT_LEN: usize = 16;
const UNCOMPRESSED_PUBLIC_KEY_LEN: usize = 65;
const RECORD_SIZE: u32 = 4096;
const PADDING_DELIMITER: u8 = 2;

const IKM_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const KEY_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

/// Errors encrypting a push payload.
#[derive(Debug, Error)]
pub enum EncryptError {
    /// The subscription's `p256dh` key did not decode to a valid uncompressed P-256 point.
    #[error("invalid p256dh key")]
    InvalidPublicKey,
    /// HKDF key derivation failed (only possible if a requested length is absurdly large).
    #[error("key derivation failed")]
    KeyDerivation,
    /// AES-128-GCM encryption failed.
    #[error("payload encryption failed")]
    Encryption,
}

/// An RFC 8291-encrypted push body plus the `dh`/`salt` components of the `Crypto-Key` and
/// `Encryption` headers (aes128gcm inlines both in the body; this struct keeps them available
/// for any caller that wants to log or re-derive them).
pub struct EncryptedPayload {
    /// The full `aes128gcm` body: header + ciphertext, ready to POST as-is.
    pub body: Vec<u8>,
}

/// Encrypts `plaintext` to the subscriber's public key and auth secret per RFC 8291.
///
/// # Errors
///
/// Returns [`EncryptError`] if the subscriber's key is malformed or encryption fails.
pub fn encrypt(
    plaintext: &[u8],
    subscriber_public_key_raw: &[u8],
    auth_secret: &[u8],
) -> Result<EncryptedPayload, EncryptError> {
    let remote_public = PublicKey::from_sec1_bytes(subscriber_public_key_raw)
        .map_err(|_| EncryptError::InvalidPublicKey)?;

    let mut salt = [0u8; SALT_LEN];
    rand::RngCore::fill_bytes(&mut OsRng, &mut salt);

    let local_secret = EphemeralSecret::random(&mut OsRng);
    let local_public = PublicKey::from(&local_secret);
    let local_public_raw = local_public.to_encoded_point(false);
    let local_public_raw = local_public_raw.as_bytes();

    let shared_secret = local_secret.diffie_hellman(&remote_public);

    let mut ikm_info = Vec::with_capacity(IKM_INFO_PREFIX.len() + 2 * UNCOMPRESSED_PUBLIC_KEY_LEN);
    ikm_info.extend_from_slice(IKM_INFO_PREFIX);
    ikm_info.extend_from_slice(subscriber_public_key_raw);
    ikm_info.extend_from_slice(local_public_raw);

    let ikm = hkdf_expand(auth_secret, shared_secret.raw_secret_bytes(), &ikm_info, 32)?;
    let content_encryption_key = hkdf_expand(&salt, &ikm, KEY_INFO, 16)?;
    let nonce = hkdf_expand(&salt, &ikm, NONCE_INFO, 12)?;

    let cipher = Aes128Gcm::new_from_slice(&content_encryption_key)
        .map_err(|_| EncryptError::KeyDerivation)?;

    let mut padded = Vec::with_capacity(plaintext.len() + 1);
    padded.extend_from_slice(plaintext);
    padded.push(PADDING_DELIMITER);

    let ciphertext = cipher
        .encrypt(nonce.as_slice().into(), padded.as_slice())
        .map_err(|_| EncryptError::Encryption)?;

    let mut body = Vec::with_capacity(SALT_LEN + 4 + 1 + UNCOMPRESSED_PUBLIC_KEY_LEN + ciphertext.len());
    body.extend_from_slice(&salt);
    body.extend_from_slice(&RECORD_SIZE.to_be_bytes());
    body.push(local_public_raw.len() as u8);
    body.extend_from_slice(local_public_raw);
    body.extend_from_slice(&ciphertext);

    Ok(EncryptedPayload { body })
}

fn hkdf_expand(salt: &[u8], ikm: &[u8], info: &[u8], len: usize) -> Result<Vec<u8>, EncryptError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; len];
    hk.expand(info, &mut okm).map_err(|_| EncryptError::KeyDerivation)?;
    Ok(okm)
}

/// Decodes a base64url-without-padding subscription key string to raw bytes.
///
/// # Errors
///
/// Returns [`EncryptError::InvalidPublicKey`] if `s` is not valid base64url.
pub fn decode_subscription_key(s: &str) -> Result<Vec<u8>, EncryptError> {
    URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|_| EncryptError::InvalidPublicKey)
}
