//! Subscription repository port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entity::Subscription;
use crate::value::{PushEndpoint, SubscriptionId, UserId};

use super::error::RepositoryError;

/// Persistence port for [`Subscription`] aggregates.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Issues the next identity for a new subscription.
    async fn next_identity(&self) -> Result<SubscriptionId, RepositoryError>;

    /// Inserts or overwrites a subscription keyed by its id.
    async fn save(&self, subscription: Subscription) -> Result<(), RepositoryError>;

    /// Looks up a subscription by id.
    async fn find_by_id(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<Subscription>, RepositoryError>;

    /// Looks up a subscription by its push endpoint, the natural external key a client
    /// resubscribes with.
    async fn find_by_endpoint(
        &self,
        endpoint: &PushEndpoint,
    ) -> Result<Option<Subscription>, RepositoryError>;

    /// All subscriptions currently eligible as delivery targets, used for broadcast jobs.
    async fn find_valid_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>, RepositoryError>;

    /// Valid subscriptions owned by a single user, used for targeted jobs.
    async fn find_valid_subscriptions_by_user_id(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>, RepositoryError>;

    /// Deletes every subscription whose `expires_at` is at or before `now`, returning the
    /// count removed.
    async fn delete_expired_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;
}
