use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;

use relay_common::settings::SettingsSource;
use relay_common::types::{DeliveryOutcome, NotificationJob};
use relay_delivery::Deliverer;

use crate::network::NetworkWatch;
use crate::store::JobStore;

/// Linear backoff step: a job that has failed retryably `n` times becomes
/// due again after `15s × n`. Linear rather than exponential keeps
/// worst-case latency bounded for the handful of attempts a job gets while
/// still shedding load under sustained failure.
const BACKOFF_STEP_SECS: i64 = 15;

pub fn backoff_delay(attempt_count: u32) -> chrono::Duration {
    chrono::Duration::seconds(BACKOFF_STEP_SECS * attempt_count as i64)
}

/// Dispatch worker that drains due jobs and drives the per-job state machine.
///
/// Delivery attempts run concurrently across jobs, bounded by the claim
/// batch size; there is no ordering guarantee between jobs, on the same line
/// or across lines.
pub struct DispatchWorker<C> {
    store: JobStore,
    client: C,
    settings: Arc<dyn SettingsSource>,
    network: NetworkWatch,
    poll_interval: Duration,
    concurrency: u32,
    max_attempts: u32,
}

impl<C> DispatchWorker<C>
where
    C: Deliverer + Clone + Send + Sync + 'static,
{
    pub fn new(
        store: JobStore,
        client: C,
        settings: Arc<dyn SettingsSource>,
        network: NetworkWatch,
        poll_interval: Duration,
        concurrency: u32,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            client,
            settings,
            network,
            poll_interval,
            concurrency,
            max_attempts,
        }
    }

    /// Run the dispatch loop until the task is cancelled.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let recovered = self.store.recover_interrupted().await?;
        if recovered > 0 {
            tracing::info!(recovered, "Re-queued jobs interrupted by restart");
        }

        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            concurrency = self.concurrency,
            max_attempts = self.max_attempts,
            "Dispatch worker started"
        );

        loop {
            self.network.wait_until_available().await;

            match self.drain_due(Utc::now()).await {
                Ok(0) => tokio::time::sleep(self.poll_interval).await,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Dispatch pass failed, backing off");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }

    /// Claim and process one batch of jobs due at `now`. Returns the number
    /// of jobs processed.
    pub async fn drain_due(&self, now: DateTime<Utc>) -> anyhow::Result<usize> {
        let due = self.store.claim_due(now, self.concurrency).await?;
        if due.is_empty() {
            return Ok(0);
        }

        let mut attempts = JoinSet::new();
        for job in due {
            let store = self.store.clone();
            let client = self.client.clone();
            let settings = self.settings.clone();
            let max_attempts = self.max_attempts;
            attempts.spawn(async move {
                attempt_job(&store, &client, settings.as_ref(), job, now, max_attempts).await
            });
        }

        let mut processed = 0;
        while let Some(result) = attempts.join_next().await {
            match result {
                Ok(Ok(())) => processed += 1,
                Ok(Err(e)) => tracing::error!(error = %e, "Delivery attempt failed to record outcome"),
                Err(e) => tracing::error!(error = %e, "Delivery task panicked"),
            }
        }

        Ok(processed)
    }
}

/// Drive one claimed job through a single delivery attempt.
///
/// Routing settings are read fresh here, not cached across jobs, so
/// configuration edits apply to in-flight retries. A missing token or slot
/// mapping abandons the job before any network call.
async fn attempt_job<C: Deliverer>(
    store: &JobStore,
    client: &C,
    settings: &dyn SettingsSource,
    job: NotificationJob,
    now: DateTime<Utc>,
    max_attempts: u32,
) -> anyhow::Result<()> {
    let routing = settings.current();

    if routing.bot_token.is_empty() {
        tracing::warn!(job_id = %job.id, "Bot token is not set, abandoning job");
        store.mark_abandoned(job.id, "bot token not configured").await?;
        return Ok(());
    }

    let Some(chat_id) = routing.channel_by_slot.get(&job.slot) else {
        tracing::warn!(job_id = %job.id, slot = job.slot, "No channel configured for slot, abandoning job");
        store
            .mark_abandoned(job.id, &format!("no channel configured for slot {}", job.slot))
            .await?;
        return Ok(());
    };

    match client.send(&routing.bot_token, chat_id, &job.text).await {
        DeliveryOutcome::Success => {
            store.mark_delivered(job.id).await?;
            tracing::info!(job_id = %job.id, slot = job.slot, "Notification delivered");
        }
        DeliveryOutcome::Fatal(reason) => {
            store.mark_abandoned(job.id, &reason).await?;
            tracing::error!(job_id = %job.id, %reason, "Notification abandoned");
        }
        DeliveryOutcome::Retryable(reason) => {
            let attempt_count = job.attempt_count + 1;
            if attempt_count >= max_attempts {
                let reason = format!("retry limit reached after {attempt_count} attempts: {reason}");
                store.mark_abandoned(job.id, &reason).await?;
                tracing::error!(job_id = %job.id, %reason, "Notification abandoned");
            } else {
                let delay = backoff_delay(attempt_count);
                store
                    .mark_retry(job.id, attempt_count, now + delay, &reason)
                    .await?;
                tracing::warn!(
                    job_id = %job.id,
                    attempt_count,
                    retry_in_secs = delay.num_seconds(),
                    %reason,
                    "Delivery failed, will retry"
                );
            }
        }
    }

    Ok(())
}
