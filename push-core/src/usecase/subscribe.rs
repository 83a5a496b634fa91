//! Subscribe/unsubscribe use cases.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use push_storage::domain::is_subscription_duplicate;
use push_storage::entity::Subscription;
use push_storage::repository::{RepositoryError, SubscriptionRepository};
use push_storage::value::{PushEndpoint, PushKeys, SubscriptionId, UserId};

/// Input to [`SubscribeUseCase::subscribe`].
pub struct SubscribeRequest {
    /// Owning user, if this subscription is tied to an authenticated account.
    pub user_id: Option<UserId>,
    /// Candidate endpoint string, validated inside the use case.
    pub endpoint: String,
    /// Candidate `p256dh` key string.
    pub p256dh_key: String,
    /// Candidate `auth` key string.
    pub auth_key: String,
    /// Free-form user-agent label.
    pub user_agent: String,
    /// Subscription expiration, epoch milliseconds, as reported by the browser.
    pub expiration_time_ms: Option<i64>,
}

/// Result of [`SubscribeUseCase::subscribe`]. Validation rejection is reported as `success =
/// false`, not as an `Err` — only a repository failure is an `Err`.
pub struct SubscribeResponse {
    /// The subscription's id, present whenever `success` is true.
    pub subscription_id: Option<SubscriptionId>,
    /// Whether the subscription was created or updated.
    pub success: bool,
    /// Human-readable outcome, suitable to surface to a caller.
    pub message: String,
}

/// Input to [`SubscribeUseCase::unsubscribe`].
pub struct UnsubscribeRequest {
    /// The subscription to invalidate.
    pub subscription_id: SubscriptionId,
}

/// Result of [`SubscribeUseCase::unsubscribe`].
pub struct UnsubscribeResponse {
    /// Whether a matching subscription was found and invalidated.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Creates, refreshes, and invalidates push subscriptions.
pub struct SubscribeUseCase {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscribeUseCase {
    /// Builds a use case around a subscription repository.
    #[must_use]
    pub const fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Upserts a subscription by endpoint: a repeat subscribe from the same browser refreshes
    /// keys and user-agent rather than creating a duplicate delivery target.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backing store is unavailable.
    pub async fn subscribe(
        &self,
        request: SubscribeRequest,
    ) -> Result<SubscribeResponse, RepositoryError> {
        let endpoint = match PushEndpoint::parse(&request.endpoint) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                return Ok(SubscribeResponse {
                    subscription_id: None,
                    success: false,
                    message: format!("Invalid endpoint: {e}"),
                })
            }
        };

        let keys = match PushKeys::parse(&request.p256dh_key, &request.auth_key) {
            Ok(keys) => keys,
            Err(e) => {
                return Ok(SubscribeResponse {
                    subscription_id: None,
                    success: false,
                    message: format!("Invalid key: {e}"),
                })
            }
        };

        let now = Utc::now();

        if let Some(mut existing) = is_subscription_duplicate(&self.subscriptions, &endpoint).await? {
            existing.update_keys(keys, now);
            existing.update_user_agent(request.user_agent, now);
            let id = existing.id();
            self.subscriptions.save(existing).await?;
            return Ok(SubscribeResponse {
                subscription_id: Some(id),
                success: true,
                message: "Subscription updated successfully".to_string(),
            });
        }

        let id = self.subscriptions.next_identity().await?;
        let expires_at = request.expiration_time_ms.and_then(epoch_millis_to_utc);
        let subscription = Subscription::new(
            id,
            request.user_id,
            endpoint,
            keys,
            request.user_agent,
            expires_at,
            now,
        );
        self.subscriptions.save(subscription).await?;

        Ok(SubscribeResponse {
            subscription_id: Some(id),
            success: true,
            message: "Subscription created successfully".to_string(),
        })
    }

    /// Marks a subscription invalid. Does not delete it; a later
    /// `DeleteExpiredSubscriptions` sweep reaps expired rows.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backing store is unavailable.
    pub async fn unsubscribe(
        &self,
        request: UnsubscribeRequest,
    ) -> Result<UnsubscribeResponse, RepositoryError> {
        let Some(mut subscription) = self.subscriptions.find_by_id(request.subscription_id).await?
        else {
            return Ok(UnsubscribeResponse {
                success: false,
                message: "Subscription not found".to_string(),
            });
        };

        subscription.mark_invalid(Utc::now());
        self.subscriptions.save(subscription).await?;

        Ok(UnsubscribeResponse {
            success: true,
            message: "Subscription removed successfully".to_string(),
        })
    }
}

fn epoch_millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
