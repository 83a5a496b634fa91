//! Composition root: wires the in-memory store, use cases, delivery worker, and HTTP surface
//! into one process.

use std::sync::Arc;

use anyhow::Result;
use axum::{Extension, Router};
use push_core::config::Environment;
use push_core::http::{router, AppState};
use push_core::usecase::{SendBatchPushUseCase, SendPushUseCase, SubscribeUseCase};
use push_core::webpush::{EcdsaVapidSigner, VapidSigner, WebPushClient};
use push_storage::repository::memory::in_memory_repositories;
use push_worker::config::WorkerConfig;
use push_worker::{Coordinator, JobProcessor};
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("starting push delivery engine");

    let environment = Environment::from_env();
    let (subscriptions, jobs, logs) = in_memory_repositories();

    let signer: Arc<dyn VapidSigner> = Arc::new(EcdsaVapidSigner::generate());
    let client = Arc::new(WebPushClient::new(signer.clone(), environment.vapid_subject().to_string()));

    let state = Arc::new(AppState {
        subscribe: Arc::new(SubscribeUseCase::new(subscriptions.clone())),
        send_push: Arc::new(SendPushUseCase::new(jobs.clone(), subscriptions.clone())),
        send_batch_push: Arc::new(SendBatchPushUseCase::new(jobs.clone(), subscriptions.clone())),
        vapid_signer: signer,
    });

    let processor = JobProcessor::new(jobs.clone(), subscriptions.clone(), logs, client);
    let coordinator = Coordinator::new(WorkerConfig::from_env(), jobs, subscriptions, processor);
    let shutdown_token = coordinator.shutdown_token();
    let worker_handle = tokio::spawn(coordinator.run());

    let app = Router::new()
        .merge(router())
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", environment.port())).await?;
    info!("push server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    shutdown_token.cancel();
    worker_handle.await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received");
}
