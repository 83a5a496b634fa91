//! End-to-end worker cycle tests against the in-memory store.

use std::sync::Arc;

use chrono::Utc;
use push_core::webpush::{EcdsaVapidSigner, VapidSigner, WebPushClient};
use push_storage::entity::{Job, Subscription};
use push_storage::repository::memory::in_memory_repositories;
use push_storage::repository::{JobRepository, SubscriptionRepository};
use push_storage::value::{PushEndpoint, PushKeys, Urgency};
use push_worker::config::WorkerConfig;
use push_worker::{Coordinator, JobProcessor};

struct TestContext {
    jobs: Arc<dyn JobRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    processor: JobProcessor,
}

fn setup_test() -> TestContext {
    let (subs, jobs, logs) = in_memory_repositories();
    let signer: Arc<dyn VapidSigner> = Arc::new(EcdsaVapidSigner::generate());
    let client = Arc::new(WebPushClient::new(signer, "mailto:test@example.com".to_string()));
    let processor = JobProcessor::new(jobs.clone(), subs.clone(), logs, client);
    TestContext { jobs, subscriptions: subs, processor }
}

async fn save_broadcast_job(ctx: &TestContext, payload: serde_json::Value) -> push_storage::value::JobId {
    let id = ctx.jobs.next_identity().await.unwrap();
    let job = Job::new(id, String::new(), None, None, Urgency::Normal, 86400, payload, None, Utc::now());
    ctx.jobs.save(job).await.unwrap();
    id
}

#[tokio::test]
async fn broadcast_job_with_no_subscriptions_succeeds_with_nothing_to_do() {
    let ctx = setup_test();
    let id = save_broadcast_job(&ctx, serde_json::json!({"title": "hello"})).await;

    ctx.processor.process(ctx.jobs.find_by_id(id).await.unwrap().unwrap()).await.unwrap();

    let stored = ctx.jobs.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.status(), push_storage::value::JobStatus::Succeeded);
}

#[tokio::test]
async fn a_full_cycle_picks_up_ready_jobs_and_leaves_none_pending() {
    let ctx = setup_test();
    save_broadcast_job(&ctx, serde_json::json!({"title": "cycle"})).await;

    let config = WorkerConfig {
        pending_batch: 100,
        retry_batch: 50,
        max_retries: 5,
        cycle_interval: std::time::Duration::from_secs(30),
    };
    let coordinator = Coordinator::new(config, ctx.jobs.clone(), ctx.subscriptions.clone(), ctx.processor);
    coordinator.shutdown_token().cancel();
    coordinator.run().await;

    let ready = ctx.jobs.find_ready_to_send_jobs(10).await.unwrap();
    assert!(ready.is_empty());
}

#[tokio::test]
async fn job_targeted_at_an_invalidated_subscription_finds_no_delivery_targets() {
    let ctx = setup_test();
    let endpoint = PushEndpoint::parse("https://fcm.googleapis.com/fcm/send/XYZ").unwrap();
    let keys = PushKeys::parse(
        "BNcRdreALRFXTkOOUHK1EtK2wtaz5Ry4YfYCA_0QTpQtUbVlUls0VJXg7A8u-Ts1XbjhazAkj7I99e8QcYP7DkM",
        "k3yauthsecretAA",
    )
    .unwrap();
    let sub_id = ctx.subscriptions.next_identity().await.unwrap();
    let now = Utc::now();
    let mut subscription = Subscription::new(sub_id, None, endpoint, keys, "ua".into(), None, now);
    subscription.mark_invalid(now);
    ctx.subscriptions.save(subscription).await.unwrap();

    let id = save_broadcast_job(&ctx, serde_json::json!({"title": "ignored"})).await;

    ctx.processor.process(ctx.jobs.find_by_id(id).await.unwrap().unwrap()).await.unwrap();

    let stored = ctx.jobs.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored.status(), push_storage::value::JobStatus::Succeeded);
}
