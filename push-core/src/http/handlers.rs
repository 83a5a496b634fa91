//! Axum handlers for the push HTTP surface.

use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, TimeZone, Utc};
use push_storage::value::{SubscriptionId, UserId};
use tracing::instrument;

use super::dto::{
    SendBatchPushBody, SendBatchPushResultBody, SendPushBody, SendPushResultBody, SubscribeBody,
    SubscriptionResultBody, VapidPublicKeyBody,
};
use super::error::AppError;
use super::state::AppState;
use crate::usecase::{
    SendBatchPushRequest, SendPushRequest, SubscribeRequest, UnsubscribeRequest,
};

/// `GET /api/push/vapid-public-key`.
#[instrument(skip(state))]
pub async fn vapid_public_key(Extension(state): Extension<Arc<AppState>>) -> Json<VapidPublicKeyBody> {
    Json(VapidPublicKeyBody { public_key: state.vapid_signer.public_key().to_string() })
}

/// `GET /healthz`.
pub async fn health() -> &'static str {
    "ok"
}

/// `POST /api/push/subscribe`.
#[instrument(skip(state, body))]
pub async fn subscribe(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<SubscribeBody>,
) -> Result<(StatusCode, Json<SubscriptionResultBody>), AppError> {
    let user_id = body.user_id.map(UserId::new).transpose().map_err(|e| AppError::bad_request(e.to_string()))?;

    let response = state
        .subscribe
        .subscribe(SubscribeRequest {
            user_id,
            endpoint: body.endpoint,
            p256dh_key: body.keys.p256dh,
            auth_key: body.keys.auth,
            user_agent: body.user_agent,
            expiration_time_ms: body.expiration_time,
        })
        .await?;

    if !response.success {
        return Err(AppError::bad_request(response.message));
    }

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResultBody {
            subscription_id: response.subscription_id.map(SubscriptionId::value),
            success: response.success,
            message: response.message,
        }),
    ))
}

/// `DELETE /api/push/subscriptions/{id}`.
#[instrument(skip(state))]
pub async fn unsubscribe(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SubscriptionResultBody>, AppError> {
    let subscription_id = SubscriptionId::new(id).map_err(|e| AppError::bad_request(e.to_string()))?;

    let response = state
        .subscribe
        .unsubscribe(UnsubscribeRequest { subscription_id })
        .await?;

    if !response.success {
        return Err(AppError::not_found(response.message));
    }

    Ok(Json(SubscriptionResultBody {
        subscription_id: Some(id),
        success: response.success,
        message: response.message,
    }))
}

/// `POST /api/push/send`.
#[instrument(skip(state, body))]
pub async fn send_push(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<SendPushBody>,
) -> Result<(StatusCode, Json<SendPushResultBody>), AppError> {
    let user_id = body.user_id.map(UserId::new).transpose().map_err(|e| AppError::bad_request(e.to_string()))?;
    let schedule_at = body.schedule_at.and_then(epoch_millis_to_utc);

    let response = state
        .send_push
        .send(SendPushRequest {
            user_id,
            idempotency_key: body.idempotency_key,
            topic: body.topic,
            urgency: body.urgency,
            ttl_seconds: body.ttl_seconds,
            payload: body.payload,
            schedule_at,
        })
        .await?;

    if !response.success {
        return Err(AppError::bad_request(response.message));
    }

    Ok((
        StatusCode::CREATED,
        Json(SendPushResultBody {
            job_id: response.job_id.map(push_storage::value::JobId::value),
            success: response.success,
            message: response.message,
        }),
    ))
}

/// `POST /api/push/send/batch`.
#[instrument(skip(state, body))]
pub async fn send_batch_push(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<SendBatchPushBody>,
) -> Result<(StatusCode, Json<SendBatchPushResultBody>), AppError> {
    if body.user_ids.is_empty() {
        return Err(AppError::bad_request("user_ids must not be empty"));
    }

    let user_ids = body
        .user_ids
        .into_iter()
        .map(UserId::new)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::bad_request(e.to_string()))?;
    let schedule_at = body.schedule_at.and_then(epoch_millis_to_utc);

    let response = state
        .send_batch_push
        .send(SendBatchPushRequest {
            user_ids,
            idempotency_key: body.idempotency_key,
            topic: body.topic,
            urgency: body.urgency,
            ttl_seconds: body.ttl_seconds,
            payload: body.payload,
            schedule_at,
        })
        .await?;

    if !response.success {
        return Err(AppError::bad_request(response.message));
    }

    Ok((
        StatusCode::CREATED,
        Json(SendBatchPushResultBody {
            job_ids: response.job_ids.into_iter().map(push_storage::value::JobId::value).collect(),
            success: response.success,
            message: response.message,
        }),
    ))
}

fn epoch_millis_to_utc(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
