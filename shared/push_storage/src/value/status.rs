//! Job lifecycle status.

use serde::{Deserialize, Serialize};

/// A push job's lifecycle state. See [`crate::entity::job::Job`] for the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// The `Pending` variant.
    Pending,
    /// The `Sending` variant.
    Sending,
    /// The `Succeeded` variant.
    Succeeded,
    /// The `Failed` variant.
    Failed,
    /// The `Cancelled` variant.
    Cancelled,
}

impl JobStatus {
    /// Terminal states are never re-entered: `succeeded` and `cancelled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Cancelled)
    }
}
