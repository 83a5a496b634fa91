//! Request/response bodies for the push HTTP surface.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Body of `POST /api/push/subscribe`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeBody {
    /// Owning user id, if this subscription is tied to an authenticated account.
    pub user_id: Option<u64>,
    /// Endpoint URL assigned by the push service.
    pub endpoint: String,
    /// Subscription keys, as reported by `PushSubscription.toJSON().keys`.
    pub keys: SubscribeKeysBody,
    /// Free-form user-agent label.
    #[serde(default)]
    pub user_agent: String,
    /// Subscription expiration, epoch milliseconds.
    pub expiration_time: Option<i64>,
}

/// The `keys` object nested in [`SubscribeBody`].
#[derive(Debug, Deserialize)]
pub struct SubscribeKeysBody {
    /// ECDH public key, base64url.
    pub p256dh: String,
    /// Authentication secret, base64url.
    pub auth: String,
}

/// Body returned by `POST /api/push/subscribe` and `DELETE /api/push/subscriptions/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResultBody {
    /// The subscription's id, present whenever `success` is true.
    pub subscription_id: Option<u64>,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Body of `POST /api/push/send`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPushBody {
    /// Targeted user, absent for a broadcast.
    pub user_id: Option<u64>,
    /// Caller-supplied deduplication key.
    #[serde(default)]
    pub idempotency_key: String,
    /// Push message collapsing topic.
    pub topic: Option<String>,
    /// Urgency hint string; empty defaults to `normal`.
    #[serde(default)]
    pub urgency: String,
    /// Requested TTL in seconds.
    #[serde(default)]
    pub ttl_seconds: i64,
    /// The payload to deliver.
    pub payload: JsonValue,
    /// Optional future dispatch time, epoch milliseconds.
    pub schedule_at: Option<i64>,
}

/// Body returned by `POST /api/push/send`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPushResultBody {
    /// The created (or deduplicated) job's id, present whenever `success` is true.
    pub job_id: Option<u64>,
    /// Whether a job now exists satisfying the request.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Body of `POST /api/push/send/batch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBatchPushBody {
    /// Recipients to attempt, in order. Must not be empty.
    pub user_ids: Vec<u64>,
    /// Shared deduplication key applied to the batch as a whole.
    #[serde(default)]
    pub idempotency_key: String,
    /// Shared push message collapsing topic.
    pub topic: Option<String>,
    /// Shared urgency hint string.
    #[serde(default)]
    pub urgency: String,
    /// Shared requested TTL in seconds.
    #[serde(default)]
    pub ttl_seconds: i64,
    /// Shared payload.
    pub payload: JsonValue,
    /// Shared optional future dispatch time, epoch milliseconds.
    pub schedule_at: Option<i64>,
}

/// Body returned by `POST /api/push/send/batch`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBatchPushResultBody {
    /// One id per job actually created.
    pub job_ids: Vec<u64>,
    /// Always true unless the shared parameters themselves are malformed.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
}

/// Body returned by `GET /api/push/vapid-public-key`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidPublicKeyBody {
    /// The uncompressed SEC1 public key, base64url-encoded.
    pub public_key: String,
}
