//! Application layer for the push delivery engine: configuration, use cases, the RFC
//! 8291/8292 Web Push client, and the HTTP ingress that fronts them.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs, dead_code)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod http;
pub mod usecase;
pub mod webpush;
