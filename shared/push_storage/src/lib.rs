//! Push subscription and job storage: value objects, entities, repository ports, and an
//! in-memory reference adapter for each port.
//!
//! This crate owns no I/O beyond the in-memory adapter; a networked adapter (SQL, DynamoDB,
//! ...) would implement the same [`repository`] traits and slot in behind `Arc<dyn Trait>`.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs, dead_code)]
#![allow(clippy::module_name_repetitions)]

pub mod domain;
pub mod entity;
pub mod repository;
pub mod value;
