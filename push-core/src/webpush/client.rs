//! RFC 8030 Web Push client: builds, signs, encrypts, and sends one delivery attempt.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use push_storage::entity::Subscription;
use push_storage::value::Urgency;

use super::crypto::{self, EncryptError};
use super::vapid::{self, VapidError, VapidSigner};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one delivery attempt, already mapped from the upstream response per §4.5/§6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// `200`–`299`.
    Success,
    /// `404` or `410`: the push service says the subscription no longer exists.
    SubscriptionGone,
    /// Any other non-2xx status: retriable.
    TransientFailure(String),
    /// No HTTP response was obtained at all (connect/timeout/TLS failure).
    TransportError(String),
}

/// A completed attempt: the outcome plus whatever is available for the attempt's [`Log`]
/// record (status/headers are absent on a [`DeliveryOutcome::TransportError`]).
///
/// [`Log`]: push_storage::entity::Log
pub struct DeliveryAttempt {
    /// The outcome, already mapped by status code.
    pub outcome: DeliveryOutcome,
    /// The HTTP status code, absent on a transport error.
    pub status: Option<u16>,
    /// Response headers, first value per name. Empty on a transport error.
    pub headers: BTreeMap<String, String>,
}

/// Sends RFC 8030 Web Push requests, VAPID-authorized and RFC 8291-encrypted.
pub struct WebPushClient {
    http: reqwest::Client,
    signer: Arc<dyn VapidSigner>,
    subject: String,
}

impl WebPushClient {
    /// Builds a client around `signer`, identifying this application server as `subject` in
    /// every VAPID JWT.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest` client fails to build (TLS backend initialization).
    #[must_use]
    pub fn new(signer: Arc<dyn VapidSigner>, subject: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build Web Push HTTP client");
        Self { http, signer, subject }
    }

    /// Delivers `payload` to `subscription`, applying `ttl`, `urgency`, and an optional
    /// `topic`.
    pub async fn deliver(
        &self,
        subscription: &Subscription,
        payload: &[u8],
        ttl_seconds: i64,
        urgency: Urgency,
        topic: Option<&str>,
    ) -> DeliveryAttempt {
        match self.try_deliver(subscription, payload, ttl_seconds, urgency, topic).await {
            Ok(attempt) => attempt,
            Err(e) => DeliveryAttempt {
                outcome: DeliveryOutcome::TransportError(e.to_string()),
                status: None,
                headers: BTreeMap::new(),
            },
        }
    }

    async fn try_deliver(
        &self,
        subscription: &Subscription,
        payload: &[u8],
        ttl_seconds: i64,
        urgency: Urgency,
        topic: Option<&str>,
    ) -> Result<DeliveryAttempt, PrepareError> {
        let endpoint = subscription.endpoint().as_str();
        let origin = vapid::endpoint_origin(endpoint).map_err(PrepareError::Vapid)?;
        let auth = self.signer.sign(&origin, &self.subject).map_err(PrepareError::Vapid)?;

        let public_key_raw = crypto::decode_subscription_key(subscription.keys().p256dh.as_str())
            .map_err(PrepareError::Encrypt)?;
        let auth_secret = crypto::decode_subscription_key(subscription.keys().auth.as_str())
            .map_err(PrepareError::Encrypt)?;
        let encrypted = crypto::encrypt(payload, &public_key_raw, &auth_secret)
            .map_err(PrepareError::Encrypt)?;

        let crypto_key = format!("p256ecdsa={}", auth.public_key_b64);

        let mut request = self
            .http
            .post(endpoint)
            .header("Authorization", auth.authorization_header)
            .header("Crypto-Key", crypto_key)
            .header("Content-Encoding", "aes128gcm")
            .header("Content-Type", "application/octet-stream")
            .header("TTL", ttl_seconds.to_string())
            .header("Urgency", urgency.to_string())
            .body(encrypted.body);

        if let Some(topic) = topic.filter(|t| !t.is_empty()) {
            request = request.header("Topic", topic);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let headers = flatten_headers(response.headers());
                let outcome = match status {
                    200..=299 => DeliveryOutcome::Success,
                    404 | 410 => DeliveryOutcome::SubscriptionGone,
                    other => {
                        DeliveryOutcome::TransientFailure(format!(
                            "push service responded with status {other}"
                        ))
                    }
                };
                Ok(DeliveryAttempt {
                    outcome,
                    status: Some(status),
                    headers,
                })
            }
            Err(e) => Ok(DeliveryAttempt {
                outcome: DeliveryOutcome::TransportError(e.to_string()),
                status: None,
                headers: BTreeMap::new(),
            }),
        }
    }
}

enum PrepareError {
    Vapid(VapidError),
    Encrypt(EncryptError),
}

impl std::fmt::Display for PrepareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vapid(e) => write!(f, "{e}"),
            Self::Encrypt(e) => write!(f, "{e}"),
        }
    }
}

fn flatten_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut flattened = BTreeMap::new();
    for name in headers.keys() {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            flattened.entry(name.to_string()).or_insert_with(|| value.to_string());
        }
    }
    flattened
}
