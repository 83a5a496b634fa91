//! Application use cases: the orchestration layer between HTTP handlers and the domain.

mod send_batch_push;
mod send_push;
mod subscribe;

pub use send_batch_push::{SendBatchPushRequest, SendBatchPushResponse, SendBatchPushUseCase};
pub use send_push::{SendPushRequest, SendPushResponse, SendPushUseCase};
pub use subscribe::{
    SubscribeRequest, SubscribeResponse, SubscribeUseCase, UnsubscribeRequest, UnsubscribeResponse,
};
