//! In-memory reference adapters. Backs a single running process; not shared across instances.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::entity::{Job, Log, Subscription};
use crate::value::{JobId, LogId, PushEndpoint, SubscriptionId, UserId};

use super::error::RepositoryError;
use super::job::JobRepository;
use super::log::LogRepository;
use super::subscription::SubscriptionRepository;

/// Monotonic id generator shared by the in-memory adapters. Starts at 1 so `0` stays reserved
/// as "no identity" (see [`crate::value::InvalidIdError`]).
#[derive(Debug, Default)]
struct IdSequence(AtomicU64);

impl IdSequence {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// In-memory [`SubscriptionRepository`], guarded by a single `RwLock` over a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    sequence: IdSequence,
    rows: RwLock<HashMap<SubscriptionId, Subscription>>,
}

impl InMemorySubscriptionRepository {
    #[must_use]
    /// Creates a new instance.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn next_identity(&self) -> Result<SubscriptionId, RepositoryError> {
        SubscriptionId::new(self.sequence.next())
            .map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }

    async fn save(&self, subscription: Subscription) -> Result<(), RepositoryError> {
        self.rows.write().await.insert(subscription.id(), subscription);
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: SubscriptionId,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_endpoint(
        &self,
        endpoint: &PushEndpoint,
    ) -> Result<Option<Subscription>, RepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|s| s.endpoint().as_str() == endpoint.as_str())
            .cloned())
    }

    async fn find_valid_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.is_delivery_target(now))
            .cloned()
            .collect())
    }

    async fn find_valid_subscriptions_by_user_id(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Subscription>, RepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|s| s.user_id() == Some(user_id) && s.is_delivery_target(now))
            .cloned()
            .collect())
    }

    async fn delete_expired_subscriptions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|_, s| !s.is_expired(now));
        Ok((before - rows.len()) as u64)
    }
}

/// In-memory [`JobRepository`].
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    sequence: IdSequence,
    rows: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobRepository {
    #[must_use]
    /// Creates a new instance.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn next_identity(&self) -> Result<JobId, RepositoryError> {
        JobId::new(self.sequence.next()).map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }

    async fn save(&self, job: Job) -> Result<(), RepositoryError> {
        self.rows.write().await.insert(job.id(), job);
        Ok(())
    }

    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<Job>, RepositoryError> {
        if idempotency_key.is_empty() {
            return Ok(None);
        }
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|j| j.idempotency_key() == idempotency_key)
            .cloned())
    }

    async fn find_ready_to_send_jobs(&self, limit: usize) -> Result<Vec<Job>, RepositoryError> {
        let now = Utc::now();
        let rows = self.rows.read().await;
        let mut jobs: Vec<Job> = rows
            .values()
            .filter(|j| j.is_ready_to_send(now))
            .cloned()
            .collect();
        jobs.sort_by_key(Job::created_at);
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn find_failed_jobs_for_retry(
        &self,
        max_retries: u32,
        limit: usize,
    ) -> Result<Vec<Job>, RepositoryError> {
        let rows = self.rows.read().await;
        let mut jobs: Vec<Job> = rows
            .values()
            .filter(|j| j.should_retry(max_retries))
            .cloned()
            .collect();
        jobs.sort_by_key(Job::updated_at);
        jobs.truncate(limit);
        Ok(jobs)
    }
}

/// In-memory [`LogRepository`].
#[derive(Debug, Default)]
pub struct InMemoryLogRepository {
    sequence: IdSequence,
    rows: RwLock<HashMap<LogId, Log>>,
}

impl InMemoryLogRepository {
    #[must_use]
    /// Creates a new instance.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    async fn next_identity(&self) -> Result<LogId, RepositoryError> {
        LogId::new(self.sequence.next()).map_err(|e| RepositoryError::Unavailable(e.to_string()))
    }

    async fn save(&self, log: Log) -> Result<(), RepositoryError> {
        self.rows.write().await.insert(log.id(), log);
        Ok(())
    }

    async fn find_by_job_id(&self, job_id: JobId) -> Result<Vec<Log>, RepositoryError> {
        let mut logs: Vec<Log> = self
            .rows
            .read()
            .await
            .values()
            .filter(|l| l.job_id() == Some(job_id))
            .cloned()
            .collect();
        logs.sort_by_key(Log::created_at);
        Ok(logs)
    }

    async fn count_successes_by_job_id(&self, job_id: JobId) -> Result<u64, RepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|l| l.job_id() == Some(job_id) && l.is_success())
            .count() as u64)
    }

    async fn count_failures_by_job_id(&self, job_id: JobId) -> Result<u64, RepositoryError> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .filter(|l| l.job_id() == Some(job_id) && !l.is_success())
            .count() as u64)
    }
}

/// Bundles the three in-memory adapters behind `Arc` for easy injection into use cases.
#[must_use]
pub fn in_memory_repositories() -> (
    Arc<InMemorySubscriptionRepository>,
    Arc<InMemoryJobRepository>,
    Arc<InMemoryLogRepository>,
) {
    (
        Arc::new(InMemorySubscriptionRepository::new()),
        Arc::new(InMemoryJobRepository::new()),
        Arc::new(InMemoryLogRepository::new()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{PushKeys, Urgency};

    fn sample_keys() -> PushKeys {
        PushKeys::parse(
            "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM",
            "k3yauthsecretAA",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn subscription_round_trips_through_save_and_find() {
        let repo = InMemorySubscriptionRepository::new();
        let id = repo.next_identity().await.unwrap();
        let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/ABC").unwrap();
        let now = Utc::now();
        let sub = Subscription::new(id, None, endpoint.clone(), sample_keys(), "ua".into(), None, now);
        repo.save(sub).await.unwrap();

        assert!(repo.find_by_id(id).await.unwrap().is_some());
        assert!(repo.find_by_endpoint(&endpoint).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn expired_subscriptions_are_deleted() {
        let repo = InMemorySubscriptionRepository::new();
        let id = repo.next_identity().await.unwrap();
        let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/ABC").unwrap();
        let now = Utc::now();
        let sub = Subscription::new(
            id,
            None,
            endpoint,
            sample_keys(),
            "ua".into(),
            Some(now - chrono::Duration::seconds(1)),
            now,
        );
        repo.save(sub).await.unwrap();

        let removed = repo.delete_expired_subscriptions(now).await.unwrap();
        assert_eq!(removed, 1);
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ready_to_send_jobs_excludes_future_schedule() {
        let repo = InMemoryJobRepository::new();
        let now = Utc::now();

        let due_id = repo.next_identity().await.unwrap();
        let due = Job::new(
            due_id,
            "key-a".into(),
            None,
            None,
            Urgency::Normal,
            3600,
            serde_json::Value::Null,
            None,
            now,
        );
        repo.save(due).await.unwrap();

        let future_id = repo.next_identity().await.unwrap();
        let future = Job::new(
            future_id,
            "key-b".into(),
            None,
            None,
            Urgency::Normal,
            3600,
            serde_json::Value::Null,
            Some(now + chrono::Duration::hours(1)),
            now,
        );
        repo.save(future).await.unwrap();

        let ready = repo.find_ready_to_send_jobs(10).await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].id(), due_id);
    }

    #[tokio::test]
    async fn idempotency_key_lookup_ignores_empty_keys() {
        let repo = InMemoryJobRepository::new();
        let now = Utc::now();
        let id = repo.next_identity().await.unwrap();
        let job = Job::new(
            id,
            String::new(),
            None,
            None,
            Urgency::Normal,
            3600,
            serde_json::Value::Null,
            None,
            now,
        );
        repo.save(job).await.unwrap();

        assert!(repo.find_by_idempotency_key("").await.unwrap().is_none());
    }
}
