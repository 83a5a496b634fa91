//! Job repository port.

use async_trait::async_trait;

use crate::entity::Job;
use crate::value::JobId;

use super::error::RepositoryError;

/// Persistence port for [`Job`] aggregates.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Issues the next identity for a new job.
    async fn next_identity(&self) -> Result<JobId, RepositoryError>;

    /// Inserts or overwrites a job keyed by its id.
    async fn save(&self, job: Job) -> Result<(), RepositoryError>;

    /// Looks up a job by id.
    async fn find_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// Looks up a job by its caller-supplied idempotency key. An empty key never matches,
    /// since callers that omit the key have opted out of deduplication.
    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<Job>, RepositoryError>;

    /// Jobs ready for a first delivery attempt (`pending`, unscheduled or due), oldest first,
    /// capped at `limit`.
    async fn find_ready_to_send_jobs(&self, limit: usize) -> Result<Vec<Job>, RepositoryError>;

    /// Jobs eligible for a retry (`failed`, `retry_count < max_retries`), oldest first, capped
    /// at `limit`. Backoff-window filtering happens in the worker, not here, since it depends
    /// on wall-clock time at scan time rather than persisted state.
    async fn find_failed_jobs_for_retry(
        &self,
        max_retries: u32,
        limit: usize,
    ) -> Result<Vec<Job>, RepositoryError>;
}
