//! VAPID authorization, RFC 8291 payload encryption, and the RFC 8030 delivery client.

mod client;
mod crypto;
mod vapid;

pub use client::{DeliveryAttempt, DeliveryOutcome, WebPushClient};
pub use vapid::{EcdsaVapidSigner, VapidAuthorization, VapidError, VapidSigner};
