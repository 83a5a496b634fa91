//! Log repository port.

use async_trait::async_trait;

use crate::entity::Log;
use crate::value::JobId;

use super::error::RepositoryError;

/// Persistence port for [`Log`] records. Append-only: there is no update or delete operation.
#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Issues the next identity for a new log record.
    async fn next_identity(&self) -> Result<crate::value::LogId, RepositoryError>;

    /// Appends a log record.
    async fn save(&self, log: Log) -> Result<(), RepositoryError>;

    /// All log records for a job, oldest first.
    async fn find_by_job_id(&self, job_id: JobId) -> Result<Vec<Log>, RepositoryError>;

    /// Count of log records for a job whose status is a `2xx`.
    async fn count_successes_by_job_id(&self, job_id: JobId) -> Result<u64, RepositoryError>;

    /// Count of log records for a job whose status is not a `2xx` (including transport
    /// failures, which carry no status at all).
    async fn count_failures_by_job_id(&self, job_id: JobId) -> Result<u64, RepositoryError>;
}
