//! Multi-user push job creation, one job per eligible recipient.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use push_storage::domain::{can_user_receive_push, find_duplicate_job_by_idempotency_key};
use push_storage::entity::{Job, DEFAULT_TTL_SECONDS};
use push_storage::repository::{JobRepository, RepositoryError, SubscriptionRepository};
use push_storage::value::{JobId, Urgency, UserId};
use serde_json::Value as JsonValue;

/// Input to [`SendBatchPushUseCase::send`].
pub struct SendBatchPushRequest {
    /// Recipients to attempt, in order. Must not be empty.
    pub user_ids: Vec<UserId>,
    /// Shared deduplication key applied to the batch as a whole, not per job.
    pub idempotency_key: String,
    /// Shared push message collapsing topic.
    pub topic: Option<String>,
    /// Shared urgency hint string; empty defaults to `normal`.
    pub urgency: String,
    /// Shared requested TTL in seconds; `<= 0` defaults to [`DEFAULT_TTL_SECONDS`].
    pub ttl_seconds: i64,
    /// Shared payload.
    pub payload: JsonValue,
    /// Shared optional future dispatch time.
    pub schedule_at: Option<DateTime<Utc>>,
}

/// Result of [`SendBatchPushUseCase::send`]. An empty `job_ids` with `success = true` is a
/// valid outcome: every recipient lacked a valid subscription.
pub struct SendBatchPushResponse {
    /// One id per job actually created (or, on an idempotent replay, the single existing job).
    pub job_ids: Vec<JobId>,
    /// Always true unless the shared parameters themselves are malformed.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
}

/// Creates one push delivery job per eligible recipient in a batch request.
pub struct SendBatchPushUseCase {
    jobs: Arc<dyn JobRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SendBatchPushUseCase {
    /// Builds a use case around the job and subscription repositories.
    #[must_use]
    pub const fn new(
        jobs: Arc<dyn JobRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self { jobs, subscriptions }
    }

    /// Creates one job per recipient that currently has a valid subscription, skipping the
    /// rest silently. The batch as a whole is deduplicated by `idempotency_key`, not each
    /// per-user job.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backing store is unavailable.
    pub async fn send(
        &self,
        request: SendBatchPushRequest,
    ) -> Result<SendBatchPushResponse, RepositoryError> {
        if let Some(existing) =
            find_duplicate_job_by_idempotency_key(&self.jobs, &request.idempotency_key).await?
        {
            return Ok(SendBatchPushResponse {
                job_ids: vec![existing.id()],
                success: true,
                message: "Batch job already exists (idempotent)".to_string(),
            });
        }

        let urgency_candidate = if request.urgency.is_empty() { "normal" } else { &request.urgency };
        let urgency = match Urgency::from_str(urgency_candidate) {
            Ok(urgency) => urgency,
            Err(e) => {
                return Ok(SendBatchPushResponse {
                    job_ids: Vec::new(),
                    success: false,
                    message: format!("Invalid job parameters: {e}"),
                })
            }
        };
        let ttl_seconds = if request.ttl_seconds <= 0 { DEFAULT_TTL_SECONDS } else { request.ttl_seconds };

        let mut job_ids = Vec::new();
        for user_id in request.user_ids {
            if !can_user_receive_push(&self.subscriptions, user_id).await? {
                continue;
            }

            let id = self.jobs.next_identity().await?;
            let job = Job::new(
                id,
                String::new(),
                Some(user_id),
                request.topic.clone(),
                urgency,
                ttl_seconds,
                request.payload.clone(),
                request.schedule_at,
                Utc::now(),
            );
            self.jobs.save(job).await?;
            job_ids.push(id);
        }

        Ok(SendBatchPushResponse {
            message: format!("Created {} push jobs successfully", job_ids.len()),
            job_ids,
            success: true,
        })
    }
}
