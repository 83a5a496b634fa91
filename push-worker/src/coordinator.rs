//! The worker's cancellable cycle loop.

use std::sync::Arc;

use chrono::Utc;
use push_storage::repository::{JobRepository, RepositoryError, SubscriptionRepository};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::backoff;
use crate::config::WorkerConfig;
use crate::processor::JobProcessor;

/// Runs the delivery cycle until cancelled: process ready jobs, process retry-eligible jobs,
/// purge expired subscriptions, sleep, repeat.
pub struct Coordinator {
    config: WorkerConfig,
    jobs: Arc<dyn JobRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    processor: JobProcessor,
    shutdown_token: CancellationToken,
}

impl Coordinator {
    /// Builds a coordinator around its config, the repositories it scans, and the processor it
    /// hands ready jobs to.
    #[must_use]
    pub fn new(
        config: WorkerConfig,
        jobs: Arc<dyn JobRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        processor: JobProcessor,
    ) -> Self {
        Self { config, jobs, subscriptions, processor, shutdown_token: CancellationToken::new() }
    }

    /// Returns a clone of the shutdown token for external control.
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs cycles until the shutdown token is cancelled.
    pub async fn run(self) {
        info!("starting push worker coordinator");
        loop {
            if self.shutdown_token.is_cancelled() {
                break;
            }

            if let Err(e) = self.run_cycle().await {
                error!(error = %e, "worker cycle failed");
            }

            tokio::select! {
                () = self.shutdown_token.cancelled() => break,
                () = sleep(self.config.cycle_interval) => {}
            }
        }
        info!("push worker coordinator stopped");
    }

    async fn run_cycle(&self) -> Result<(), RepositoryError> {
        let processed = self.process_pending_jobs().await?;
        let retried = self.process_retries().await?;
        let expired = self.subscriptions.delete_expired_subscriptions(Utc::now()).await?;
        if processed > 0 || retried > 0 || expired > 0 {
            info!(processed, retried, expired, "worker cycle summary");
        }
        Ok(())
    }

    async fn process_pending_jobs(&self) -> Result<usize, RepositoryError> {
        let ready = self.jobs.find_ready_to_send_jobs(self.config.pending_batch).await?;
        let count = ready.len();
        for job in ready {
            self.processor.process(job).await?;
        }
        Ok(count)
    }

    async fn process_retries(&self) -> Result<usize, RepositoryError> {
        let candidates = self
            .jobs
            .find_failed_jobs_for_retry(self.config.max_retries, self.config.retry_batch)
            .await?;

        let now = Utc::now();
        let mut processed = 0usize;
        for job in candidates {
            let elapsed = now - job.updated_at();
            if elapsed < backoff::delay(job.retry_count()) {
                continue;
            }
            self.processor.process(job).await?;
            processed += 1;
        }
        Ok(processed)
    }
}
