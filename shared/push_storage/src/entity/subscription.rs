//! The `Subscription` aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::{PushEndpoint, PushKeys, SubscriptionId, UserId};

/// A browser-style push subscription: an endpoint plus the keys needed to encrypt a payload to
/// it, optionally owned by a user.
///
/// A subscription with `is_valid = false`, or whose `expires_at` has passed, is never a
/// delivery target (see [`Subscription::is_delivery_target`]). Validity only ever transitions
/// `true -> false`, never back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    id: SubscriptionId,
    user_id: Option<UserId>,
    endpoint: PushEndpoint,
    keys: PushKeys,
    user_agent: String,
    expires_at: Option<DateTime<Utc>>,
    is_valid: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Constructs a new, valid subscription.
    #[must_use]
    pub fn new(
        id: SubscriptionId,
        user_id: Option<UserId>,
        endpoint: PushEndpoint,
        keys: PushKeys,
        user_agent: String,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            endpoint,
            keys,
            user_agent,
            expires_at,
            is_valid: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a subscription from stored fields, bypassing the `new` invariants. Used by
    /// repository implementations when loading a record back out of storage.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn reconstruct(
        id: SubscriptionId,
        user_id: Option<UserId>,
        endpoint: PushEndpoint,
        keys: PushKeys,
        user_agent: String,
        expires_at: Option<DateTime<Utc>>,
        is_valid: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            endpoint,
            keys,
            user_agent,
            expires_at,
            is_valid,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    /// Returns the `id`.
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    /// Returns the `user_id`.
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    #[must_use]
    /// Returns the `endpoint`.
    pub const fn endpoint(&self) -> &PushEndpoint {
        &self.endpoint
    }

    #[must_use]
    /// Returns the `keys`.
    pub const fn keys(&self) -> &PushKeys {
        &self.keys
    }

    #[must_use]
    /// Returns the `user_agent`.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    /// Returns the `expires_at`.
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    #[must_use]
    /// Returns the `is_valid`.
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[must_use]
    /// Returns the `created_at`.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    /// Returns the `updated_at`.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `expires_at` is in the past relative to `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t < now)
    }

    /// Whether this subscription should be used as a delivery target: valid and not expired.
    #[must_use]
    pub fn is_delivery_target(&self, now: DateTime<Utc>) -> bool {
        self.is_valid && !self.is_expired(now)
    }

    /// Marks the subscription invalid. Monotonic: calling this on an already-invalid
    /// subscription is a no-op besides bumping `updated_at`.
    pub fn mark_invalid(&mut self, now: DateTime<Utc>) {
        self.is_valid = false;
        self.updated_at = now;
    }

    /// Replaces the key pair, e.g. when a reinstalled client resubscribes with the same
    /// endpoint but rotated keys.
    pub fn update_keys(&mut self, keys: PushKeys, now: DateTime<Utc>) {
        self.keys = keys;
        self.updated_at = now;
    }

    /// Replaces the free-form user-agent label.
    pub fn update_user_agent(&mut self, user_agent: String, now: DateTime<Utc>) {
        self.user_agent = user_agent;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PushKeys;

    fn sample_keys() -> PushKeys {
        PushKeys::parse(
            "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM",
            "k3yauthsecretAA",
        )
        .unwrap()
    }

    #[test]
    fn mark_invalid_is_monotonic_and_bumps_updated_at() {
        let now = Utc::now();
        let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/ABC").unwrap();
        let mut sub = Subscription::new(
            SubscriptionId::new(1).unwrap(),
            None,
            endpoint,
            sample_keys(),
            "test".to_string(),
            None,
            now,
        );
        assert!(sub.is_valid());

        let later = now + chrono::Duration::seconds(5);
        sub.mark_invalid(later);
        assert!(!sub.is_valid());
        assert!(sub.updated_at() >= now);

        // Invalidating again stays invalid.
        sub.mark_invalid(later);
        assert!(!sub.is_valid());
    }

    #[test]
    fn expired_subscription_is_not_a_delivery_target() {
        let now = Utc::now();
        let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/ABC").unwrap();
        let sub = Subscription::new(
            SubscriptionId::new(1).unwrap(),
            None,
            endpoint,
            sample_keys(),
            "test".to_string(),
            Some(now - chrono::Duration::seconds(1)),
            now - chrono::Duration::seconds(10),
        );
        assert!(sub.is_expired(now));
        assert!(!sub.is_delivery_target(now));
    }

    #[test]
    fn invalid_subscription_is_not_a_delivery_target() {
        let now = Utc::now();
        let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/ABC").unwrap();
        let mut sub = Subscription::new(
            SubscriptionId::new(1).unwrap(),
            None,
            endpoint,
            sample_keys(),
            "test".to_string(),
            None,
            now,
        );
        sub.mark_invalid(now);
        assert!(!sub.is_delivery_target(now));
    }
}
