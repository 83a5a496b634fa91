//! Domain services: stateless rules that span more than one aggregate.

use std::sync::Arc;

use chrono::Utc;

use crate::entity::Subscription;
use crate::repository::{JobRepository, RepositoryError, SubscriptionRepository};
use crate::value::{PushEndpoint, UserId};

/// Checks whether a subscription with the same endpoint already exists.
///
/// Two browsers resubscribing the same endpoint (e.g. after a service worker reinstall) should
/// update the existing row rather than create a duplicate delivery target.
pub async fn is_subscription_duplicate(
    subscriptions: &Arc<dyn SubscriptionRepository>,
    endpoint: &PushEndpoint,
) -> Result<Option<Subscription>, RepositoryError> {
    subscriptions.find_by_endpoint(endpoint).await
}

/// Checks whether a job with the same idempotency key has already been created. An empty key
/// always reports no duplicate, since the caller opted out of deduplication.
pub async fn find_duplicate_job_by_idempotency_key(
    jobs: &Arc<dyn JobRepository>,
    idempotency_key: &str,
) -> Result<Option<crate::entity::Job>, RepositoryError> {
    if idempotency_key.is_empty() {
        return Ok(None);
    }
    jobs.find_by_idempotency_key(idempotency_key).await
}

/// Whether a user currently has at least one valid, non-expired subscription. Used by the send
/// use case to short-circuit targeted sends to users who could never receive them.
pub async fn can_user_receive_push(
    subscriptions: &Arc<dyn SubscriptionRepository>,
    user_id: UserId,
) -> Result<bool, RepositoryError> {
    let now = Utc::now();
    let targets = subscriptions
        .find_valid_subscriptions_by_user_id(user_id, now)
        .await?;
    Ok(!targets.is_empty())
}
