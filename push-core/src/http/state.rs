//! Shared state injected into every handler via `axum::Extension`.

use std::sync::Arc;

use crate::usecase::{SendBatchPushUseCase, SendPushUseCase, SubscribeUseCase};
use crate::webpush::VapidSigner;

/// Everything a push HTTP handler needs, composed once at startup.
pub struct AppState {
    /// Subscribe/unsubscribe use case.
    pub subscribe: Arc<SubscribeUseCase>,
    /// Single-target/broadcast send use case.
    pub send_push: Arc<SendPushUseCase>,
    /// Multi-user batch send use case.
    pub send_batch_push: Arc<SendBatchPushUseCase>,
    /// VAPID signer, consulted only for its public key on this surface.
    pub vapid_signer: Arc<dyn VapidSigner>,
}
