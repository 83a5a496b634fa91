//! The `Log` entity: an immutable record of a single delivery attempt.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::{JobId, LogId, SubscriptionId};

/// One attempt to deliver a job to a single subscription. Append-only: once written, a log
/// record is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    id: LogId,
    job_id: Option<JobId>,
    subscription_id: Option<SubscriptionId>,
    status: Option<u16>,
    headers: BTreeMap<String, String>,
    error: String,
    created_at: DateTime<Utc>,
}

impl Log {
    /// Records a push service HTTP response (status present, error empty on success).
    #[must_use]
    pub fn new(
        id: LogId,
        job_id: Option<JobId>,
        subscription_id: Option<SubscriptionId>,
        status: Option<u16>,
        headers: BTreeMap<String, String>,
        error: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_id,
            subscription_id,
            status,
            headers,
            error,
            created_at: now,
        }
    }

    /// Reconstructs a log record from stored fields.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn reconstruct(
        id: LogId,
        job_id: Option<JobId>,
        subscription_id: Option<SubscriptionId>,
        status: Option<u16>,
        headers: BTreeMap<String, String>,
        error: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_id,
            subscription_id,
            status,
            headers,
            error,
            created_at,
        }
    }

    #[must_use]
    /// Returns the `id`.
    pub const fn id(&self) -> LogId {
        self.id
    }

    #[must_use]
    /// Returns the `job_id`.
    pub const fn job_id(&self) -> Option<JobId> {
        self.job_id
    }

    #[must_use]
    /// Returns the `subscription_id`.
    pub const fn subscription_id(&self) -> Option<SubscriptionId> {
        self.subscription_id
    }

    #[must_use]
    /// Returns the `status`.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    /// Returns the `headers`.
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    #[must_use]
    /// Returns the `error`.
    pub fn error(&self) -> &str {
        &self.error
    }

    #[must_use]
    /// Returns the `created_at`.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// A `2xx` response from the push service.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| (200..300).contains(&s))
    }

    /// `404` or `410`: the push service is telling us the subscription no longer exists.
    #[must_use]
    pub fn subscription_expired(&self) -> bool {
        matches!(self.status, Some(404) | Some(410))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    #[test]
    fn two_hundred_is_success() {
        let log = Log::new(
            LogId::new(1).unwrap(),
            None,
            None,
            Some(201),
            headers(),
            String::new(),
            Utc::now(),
        );
        assert!(log.is_success());
        assert!(!log.subscription_expired());
    }

    #[test]
    fn four_oh_four_and_four_ten_mark_subscription_expired() {
        let now = Utc::now();
        let not_found = Log::new(LogId::new(1).unwrap(), None, None, Some(404), headers(), String::new(), now);
        let gone = Log::new(LogId::new(2).unwrap(), None, None, Some(410), headers(), String::new(), now);
        assert!(not_found.subscription_expired());
        assert!(gone.subscription_expired());
        assert!(!not_found.is_success());
    }

    #[test]
    fn transport_failure_has_no_status() {
        let log = Log::new(
            LogId::new(1).unwrap(),
            None,
            None,
            None,
            headers(),
            "connection reset".to_string(),
            Utc::now(),
        );
        assert!(!log.is_success());
        assert!(!log.subscription_expired());
        assert_eq!(log.error(), "connection reset");
    }
}
