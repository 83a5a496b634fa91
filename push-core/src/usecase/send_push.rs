//! Single-target and broadcast push job creation.

use std::sync::Arc;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use push_storage::domain::{can_user_receive_push, find_duplicate_job_by_idempotency_key};
use push_storage::entity::{Job, DEFAULT_TTL_SECONDS};
use push_storage::repository::{JobRepository, RepositoryError, SubscriptionRepository};
use push_storage::value::{JobId, Urgency, UserId};
use serde_json::Value as JsonValue;

/// Input to [`SendPushUseCase::send`].
pub struct SendPushRequest {
    /// Targeted user, absent for a broadcast to every valid subscription.
    pub user_id: Option<UserId>,
    /// Caller-supplied deduplication key. Empty means no deduplication.
    pub idempotency_key: String,
    /// Push message collapsing topic, per RFC 8030.
    pub topic: Option<String>,
    /// Urgency hint string; empty defaults to `normal`.
    pub urgency: String,
    /// Requested TTL in seconds; `<= 0` defaults to [`DEFAULT_TTL_SECONDS`].
    pub ttl_seconds: i64,
    /// The payload to deliver, serialized to JSON bytes at delivery time.
    pub payload: JsonValue,
    /// Optional future dispatch time.
    pub schedule_at: Option<DateTime<Utc>>,
}

/// Result of [`SendPushUseCase::send`]. Validation rejection is `success = false`, not an
/// `Err` — only a repository failure is an `Err`.
pub struct SendPushResponse {
    /// The created (or deduplicated) job's id, present whenever `success` is true.
    pub job_id: Option<JobId>,
    /// Whether a job now exists satisfying the request.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

/// Creates a single push delivery job, targeted or broadcast.
pub struct SendPushUseCase {
    jobs: Arc<dyn JobRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SendPushUseCase {
    /// Builds a use case around the job and subscription repositories.
    #[must_use]
    pub const fn new(
        jobs: Arc<dyn JobRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self { jobs, subscriptions }
    }

    /// Creates a job, short-circuiting on a matching idempotency key and rejecting targeted
    /// sends to users with no valid subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backing store is unavailable.
    pub async fn send(&self, request: SendPushRequest) -> Result<SendPushResponse, RepositoryError> {
        if let Some(existing) =
            find_duplicate_job_by_idempotency_key(&self.jobs, &request.idempotency_key).await?
        {
            return Ok(SendPushResponse {
                job_id: Some(existing.id()),
                success: true,
                message: "Job already exists (idempotent)".to_string(),
            });
        }

        if let Some(user_id) = request.user_id {
            if !can_user_receive_push(&self.subscriptions, user_id).await? {
                return Ok(SendPushResponse {
                    job_id: None,
                    success: false,
                    message: "User has no valid push subscriptions".to_string(),
                });
            }
        }

        let urgency_candidate = if request.urgency.is_empty() { "normal" } else { &request.urgency };
        let urgency = match Urgency::from_str(urgency_candidate) {
            Ok(urgency) => urgency,
            Err(e) => {
                return Ok(SendPushResponse {
                    job_id: None,
                    success: false,
                    message: format!("Invalid job parameters: {e}"),
                })
            }
        };
        let ttl_seconds = if request.ttl_seconds <= 0 { DEFAULT_TTL_SECONDS } else { request.ttl_seconds };

        let id = self.jobs.next_identity().await?;
        let job = Job::new(
            id,
            request.idempotency_key,
            request.user_id,
            request.topic,
            urgency,
            ttl_seconds,
            request.payload,
            request.schedule_at,
            Utc::now(),
        );
        self.jobs.save(job).await?;

        Ok(SendPushResponse {
            job_id: Some(id),
            success: true,
            message: "Push job created successfully".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use push_storage::entity::Subscription;
    use push_storage::repository::memory::in_memory_repositories;
    use push_storage::value::{PushEndpoint, PushKeys};

    fn sample_request() -> SendPushRequest {
        SendPushRequest {
            user_id: None,
            idempotency_key: String::new(),
            topic: None,
            urgency: String::new(),
            ttl_seconds: 0,
            payload: serde_json::json!({"title": "hi"}),
            schedule_at: None,
        }
    }

    #[tokio::test]
    async fn broadcast_defaults_urgency_and_ttl() {
        let (subs, jobs, _logs) = in_memory_repositories();
        let use_case = SendPushUseCase::new(jobs.clone(), subs);

        let response = use_case.send(sample_request()).await.unwrap();
        assert!(response.success);
        let job = jobs.find_by_id(response.job_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(job.urgency(), Urgency::Normal);
        assert_eq!(job.ttl_seconds(), DEFAULT_TTL_SECONDS);
    }

    #[tokio::test]
    async fn repeated_idempotency_key_returns_same_job_without_creating_another() {
        let (subs, jobs, _logs) = in_memory_repositories();
        let use_case = SendPushUseCase::new(jobs, subs);

        let mut request = sample_request();
        request.idempotency_key = "order-123".to_string();
        let first = use_case.send(request).await.unwrap();

        let mut repeat = sample_request();
        repeat.idempotency_key = "order-123".to_string();
        repeat.payload = serde_json::json!({"title": "different"});
        let second = use_case.send(repeat).await.unwrap();

        assert_eq!(first.job_id, second.job_id);
        assert_eq!(second.message, "Job already exists (idempotent)");
    }

    #[tokio::test]
    async fn targeted_send_to_user_without_subscriptions_is_rejected() {
        let (subs, jobs, _logs) = in_memory_repositories();
        let use_case = SendPushUseCase::new(jobs, subs);

        let mut request = sample_request();
        request.user_id = Some(UserId::new(7).unwrap());
        let response = use_case.send(request).await.unwrap();
        assert!(!response.success);
        assert!(response.job_id.is_none());
    }

    #[tokio::test]
    async fn targeted_send_to_user_with_subscription_succeeds() {
        let (subs, jobs, _logs) = in_memory_repositories();
        let user_id = UserId::new(7).unwrap();
        let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/ABC").unwrap();
        let keys = PushKeys::parse(
            "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM",
            "k3yauthsecretAA",
        )
        .unwrap();
        let sub_id = subs.next_identity().await.unwrap();
        let now = Utc::now();
        subs.save(Subscription::new(sub_id, Some(user_id), endpoint, keys, "ua".into(), None, now))
            .await
            .unwrap();

        let use_case = SendPushUseCase::new(jobs, subs);
        let mut request = sample_request();
        request.user_id = Some(user_id);
        let response = use_case.send(request).await.unwrap();
        assert!(response.success);
    }

    #[tokio::test]
    async fn rejects_unknown_urgency_without_persisting() {
        let (subs, jobs, _logs) = in_memory_repositories();
        let use_case = SendPushUseCase::new(jobs, subs);

        let mut request = sample_request();
        request.urgency = "urgent".to_string();
        let response = use_case.send(request).await.unwrap();
        assert!(!response.success);
        assert!(response.job_id.is_none());
    }
}
