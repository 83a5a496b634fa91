//! The `Job` aggregate: a persisted intent to deliver a payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::value::{JobId, JobStatus, Urgency, UserId};

/// Default TTL applied when a job is created with a non-positive TTL.
pub const DEFAULT_TTL_SECONDS: i64 = 86_400;

/// A push job: deliver `payload` to a user's subscriptions (or, if `user_id` is absent, to
/// every valid subscription) subject to scheduling and retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    idempotency_key: String,
    user_id: Option<UserId>,
    topic: Option<String>,
    urgency: Urgency,
    ttl_seconds: i64,
    payload: JsonValue,
    schedule_at: Option<DateTime<Utc>>,
    status: JobStatus,
    retry_count: u32,
    last_error: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Job {
    /// Constructs a new job in `pending` state.
    ///
    /// `ttl_seconds` is expected to already have had the `<= 0 -> 86400` default applied by the
    /// caller (the use case layer); this constructor does not re-derive it, only carries it.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: JobId,
        idempotency_key: String,
        user_id: Option<UserId>,
        topic: Option<String>,
        urgency: Urgency,
        ttl_seconds: i64,
        payload: JsonValue,
        schedule_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            idempotency_key,
            user_id,
            topic,
            urgency,
            ttl_seconds,
            payload,
            schedule_at,
            status: JobStatus::Pending,
            retry_count: 0,
            last_error: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a job from stored fields, bypassing the `new` defaults.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn reconstruct(
        id: JobId,
        idempotency_key: String,
        user_id: Option<UserId>,
        topic: Option<String>,
        urgency: Urgency,
        ttl_seconds: i64,
        payload: JsonValue,
        schedule_at: Option<DateTime<Utc>>,
        status: JobStatus,
        retry_count: u32,
        last_error: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            idempotency_key,
            user_id,
            topic,
            urgency,
            ttl_seconds,
            payload,
            schedule_at,
            status,
            retry_count,
            last_error,
            created_at,
            updated_at,
        }
    }

    #[must_use]
    /// Returns the `id`.
    pub const fn id(&self) -> JobId {
        self.id
    }

    #[must_use]
    /// Returns the `idempotency_key`.
    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    #[must_use]
    /// Returns the `user_id`.
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    #[must_use]
    /// Returns the `topic`.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    #[must_use]
    /// Returns the `urgency`.
    pub const fn urgency(&self) -> Urgency {
        self.urgency
    }

    #[must_use]
    /// Returns the `ttl_seconds`.
    pub const fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    #[must_use]
    /// Returns the `payload`.
    pub const fn payload(&self) -> &JsonValue {
        &self.payload
    }

    #[must_use]
    /// Returns the `schedule_at`.
    pub const fn schedule_at(&self) -> Option<DateTime<Utc>> {
        self.schedule_at
    }

    #[must_use]
    /// Returns the `status`.
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    #[must_use]
    /// Returns the `retry_count`.
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    /// Returns the `last_error`.
    pub fn last_error(&self) -> &str {
        &self.last_error
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

    /// `pending|failed -> sending`. The worker calls this before dispatching so a second
    /// concurrent worker observing the job in `sending` does not re-pick it.
    pub fn mark_sending(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Sending;
        self.updated_at = now;
    }

    /// `sending -> succeeded`. Clears `last_error`.
    pub fn mark_succeeded(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Succeeded;
        self.last_error.clear();
        self.updated_at = now;
    }

    /// `sending -> failed`, incrementing `retry_count`. Called on *every* failure transition,
    /// including the first — `maxRetries=5` therefore permits 5 attempts total (initial + 4
    /// retries), not 5 retries on top of the initial attempt.
    pub fn mark_failed(&mut self, error: String, now: DateTime<Utc>) {
        self.status = JobStatus::Failed;
        self.last_error = error;
        self.retry_count += 1;
        self.updated_at = now;
    }

    /// `any -> cancelled`. Terminal.
    pub fn mark_cancelled(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Cancelled;
        self.updated_at = now;
    }

    /// Ready iff `pending` and either unscheduled or scheduled at/before `now`.
    #[must_use]
    pub fn is_ready_to_send(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Pending && self.schedule_at.is_none_or(|at| at <= now)
    }

    /// Retry-eligible iff `failed` and under the retry ceiling. Backoff elapsed-ness is a
    /// worker-cycle concern (see `push-worker::backoff`), not an entity invariant, since it
    /// depends on wall-clock time at the moment of the scan rather than on job state alone.
    #[must_use]
    pub fn should_retry(&self, max_retries: u32) -> bool {
        self.status == JobStatus::Failed && self.retry_count < max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job(now: DateTime<Utc>) -> Job {
        Job::new(
            JobId::new(1).unwrap(),
            String::new(),
            None,
            None,
            Urgency::Normal,
            DEFAULT_TTL_SECONDS,
            JsonValue::Null,
            None,
            now,
        )
    }

    #[test]
    fn retry_count_increases_on_every_failed_transition_never_decreases() {
        let now = Utc::now();
        let mut job = sample_job(now);
        assert_eq!(job.retry_count(), 0);

        job.mark_failed("boom".to_string(), now);
        assert_eq!(job.retry_count(), 1);

        job.mark_failed("boom again".to_string(), now);
        assert_eq!(job.retry_count(), 2);
    }

    #[test]
    fn max_retries_five_permits_five_total_attempts() {
        let now = Utc::now();
        let mut job = sample_job(now);
        for _ in 0..5 {
            job.mark_failed("err".to_string(), now);
        }
        assert_eq!(job.retry_count(), 5);
        assert!(!job.should_retry(5));
        assert!(job.should_retry(6));
    }

    #[test]
    fn succeeded_clears_last_error() {
        let now = Utc::now();
        let mut job = sample_job(now);
        job.mark_failed("err".to_string(), now);
        assert_eq!(job.last_error(), "err");
        job.mark_succeeded(now);
        assert_eq!(job.last_error(), "");
        assert_eq!(job.status(), JobStatus::Succeeded);
    }

    #[test]
    fn future_schedule_is_not_ready() {
        let now = Utc::now();
        let job = Job::new(
            JobId::new(1).unwrap(),
            String::new(),
            None,
            None,
            Urgency::Normal,
            DEFAULT_TTL_SECONDS,
            JsonValue::Null,
            Some(now + chrono::Duration::seconds(60)),
            now,
        );
        assert!(!job.is_ready_to_send(now));
        assert!(job.is_ready_to_send(now + chrono::Duration::seconds(61)));
    }

    #[test]
    fn exactly_at_schedule_time_is_ready() {
        let now = Utc::now();
        let scheduled_for = now + chrono::Duration::seconds(30);
        let job = Job::new(
            JobId::new(1).unwrap(),
            String::new(),
            None,
            None,
            Urgency::Normal,
            DEFAULT_TTL_SECONDS,
            JsonValue::Null,
            Some(scheduled_for),
            now,
        );
        assert!(job.is_ready_to_send(scheduled_for));
    }

    #[test]
    fn ttl_zero_is_carried_verbatim() {
        let now = Utc::now();
        let job = Job::new(
            JobId::new(1).unwrap(),
            String::new(),
            None,
            None,
            Urgency::Normal,
            0,
            JsonValue::Null,
            None,
            now,
        );
        assert_eq!(job.ttl_seconds(), 0);
    }
}
