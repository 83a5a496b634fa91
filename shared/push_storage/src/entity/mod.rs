//! Entity model: the aggregates persisted by this crate's repositories.

mod job;
mod log;
mod subscription;

pub use job::{Job, DEFAULT_TTL_SECONDS};
pub use log::Log;
pub use subscription::Subscription;
