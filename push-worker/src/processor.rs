//! Per-job and per-subscription delivery processing.

use std::sync::Arc;

use chrono::Utc;
use push_core::webpush::{DeliveryOutcome, WebPushClient};
use push_storage::entity::{Job, Log, Subscription};
use push_storage::repository::{JobRepository, LogRepository, RepositoryError, SubscriptionRepository};

/// Drives one job through `sending` to a terminal state, attempting delivery to every target
/// subscription and recording a [`Log`] per attempt.
pub struct JobProcessor {
    jobs: Arc<dyn JobRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    logs: Arc<dyn LogRepository>,
    client: Arc<WebPushClient>,
}

impl JobProcessor {
    /// Builds a processor around the repositories and delivery client a worker cycle shares
    /// across every job it processes.
    #[must_use]
    pub const fn new(
        jobs: Arc<dyn JobRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        logs: Arc<dyn LogRepository>,
        client: Arc<WebPushClient>,
    ) -> Self {
        Self { jobs, subscriptions, logs, client }
    }

    /// Processes one job to completion: resolves its target subscriptions, attempts delivery
    /// to each, and applies the terminal state transition.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if the backing store is unavailable at any persistence
    /// point. A delivery failure against the push service is never an `Err` here — it is
    /// folded into the job's terminal status instead.
    pub async fn process(&self, mut job: Job) -> Result<(), RepositoryError> {
        let now = Utc::now();
        job.mark_sending(now);
        self.jobs.save(job.clone()).await?;

        let targets = match self.resolve_targets(&job, now).await {
            Ok(targets) => targets,
            Err(e) => {
                job.mark_failed(e.to_string(), Utc::now());
                self.jobs.save(job).await?;
                return Ok(());
            }
        };

        if targets.is_empty() {
            job.mark_succeeded(Utc::now());
            self.jobs.save(job).await?;
            return Ok(());
        }

        let mut success_count = 0u32;
        let mut failure_count = 0u32;

        for subscription in targets {
            match self.deliver_to(&job, subscription).await {
                Ok(true) => success_count += 1,
                Ok(false) => failure_count += 1,
                Err(e) => return Err(e),
            }
        }

        let finished_at = Utc::now();
        if failure_count == 0 {
            job.mark_succeeded(finished_at);
        } else if success_count == 0 {
            job.mark_failed(format!("All {failure_count} deliveries failed"), finished_at);
        } else {
            job.mark_succeeded(finished_at);
        }
        self.jobs.save(job).await?;

        Ok(())
    }

    async fn resolve_targets(
        &self,
        job: &Job,
        now: chrono::DateTime<Utc>,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        match job.user_id() {
            Some(user_id) => self.subscriptions.find_valid_subscriptions_by_user_id(user_id, now).await,
            None => self.subscriptions.find_valid_subscriptions(now).await,
        }
    }

    /// Attempts delivery to one subscription, recording a [`Log`] and returning whether it
    /// counted as a success.
    async fn deliver_to(&self, job: &Job, mut subscription: Subscription) -> Result<bool, RepositoryError> {
        let payload = serde_json::to_vec(job.payload()).unwrap_or_default();
        let attempt = self
            .client
            .deliver(&subscription, &payload, job.ttl_seconds(), job.urgency(), job.topic())
            .await;

        let log_id = self.logs.next_identity().await?;
        let now = Utc::now();

        let success = match &attempt.outcome {
            DeliveryOutcome::Success => true,
            DeliveryOutcome::SubscriptionGone => {
                subscription.mark_invalid(now);
                self.subscriptions.save(subscription.clone()).await?;
                false
            }
            DeliveryOutcome::TransientFailure(_) | DeliveryOutcome::TransportError(_) => false,
        };

        let error = match &attempt.outcome {
            DeliveryOutcome::Success | DeliveryOutcome::SubscriptionGone => String::new(),
            DeliveryOutcome::TransientFailure(message) | DeliveryOutcome::TransportError(message) => {
                message.clone()
            }
        };

        let log = Log::new(
            log_id,
            Some(job.id()),
            Some(subscription.id()),
            attempt.status,
            attempt.headers,
            error,
            now,
        );
        self.logs.save(log).await?;

        Ok(success)
    }
}
