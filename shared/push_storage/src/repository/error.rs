//! Repository-level error type.

use thiserror::Error;

/// Errors surfaced by a repository implementation. The in-memory reference adapter only ever
/// returns `Unavailable` (a poisoned lock), but the variant exists so a future networked
/// adapter (SQL, DynamoDB, ...) has somewhere to report connection and serialization failures
/// without widening this trait's surface.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The backing store could not be reached or its internal lock was poisoned.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
