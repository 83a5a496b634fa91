//! Route table for the push HTTP surface.

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers;

/// Builds the push API router. The caller is responsible for layering `Extension<Arc<AppState>>`
/// and any tracing/timeout middleware.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/healthz", get(handlers::health))
        .route("/api/push/vapid-public-key", get(handlers::vapid_public_key))
        .route("/api/push/subscribe", post(handlers::subscribe))
        .route("/api/push/subscriptions/{id}", delete(handlers::unsubscribe))
        .route("/api/push/send", post(handlers::send_push))
        .route("/api/push/send/batch", post(handlers::send_batch_push))
}
