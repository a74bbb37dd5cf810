use std::sync::{Arc, Mutex};

use relay_common::error::AppError;
use relay_common::types::{CallState, ClassifiedEvent, EventKind, NotificationJob};
use relay_lines::LineRegistry;
use relay_queue::JobStore;

use crate::callstate::CallStateCache;
use crate::format;

/// Central pipeline that turns raw host events into durable jobs.
///
/// Each invocation is an independent unit of work: events on different
/// lines, or successive events on the same line, share no state beyond the
/// call-state cache and the durable queue. Registry lookups and formatting
/// never fail; the only error out of here is the enqueue write.
pub struct EventPipeline {
    registry: Arc<LineRegistry>,
    store: JobStore,
    call_states: Mutex<CallStateCache>,
}

impl EventPipeline {
    pub fn new(registry: Arc<LineRegistry>, store: JobStore) -> Self {
        Self {
            registry,
            store,
            call_states: Mutex::new(CallStateCache::new()),
        }
    }

    /// An SMS arrived on the given subscription. Always produces one job.
    pub async fn handle_sms(
        &self,
        subscription_id: i32,
        sender: &str,
        body: &str,
    ) -> Result<NotificationJob, AppError> {
        let line = self.registry.resolve(subscription_id);
        let event = ClassifiedEvent {
            line,
            kind: EventKind::Sms {
                sender: sender.to_string(),
                body: body.to_string(),
            },
        };

        let text = format::format_event(&event);
        let job = self.store.enqueue(event.line.slot, &text).await?;

        tracing::info!(
            job_id = %job.id,
            slot = event.line.slot,
            sender,
            "SMS event queued"
        );
        Ok(job)
    }

    /// The phone state changed on the given subscription.
    ///
    /// Duplicate states are suppressed per line, and only the transition to
    /// idle (call ended) produces a job; ringing and off-hook transitions
    /// update the cache and are otherwise ignored.
    pub async fn handle_call_state(
        &self,
        subscription_id: i32,
        state: CallState,
        number: &str,
    ) -> Result<Option<NotificationJob>, AppError> {
        let line = self.registry.resolve(subscription_id);

        let changed = self
            .call_states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .observe(line.slot, state);
        if !changed {
            tracing::debug!(slot = line.slot, %state, "Duplicate call state ignored");
            return Ok(None);
        }

        if state != CallState::Idle {
            return Ok(None);
        }

        let event = ClassifiedEvent {
            line,
            kind: EventKind::Call {
                number: number.to_string(),
            },
        };

        let text = format::format_event(&event);
        let job = self.store.enqueue(event.line.slot, &text).await?;

        tracing::info!(
            job_id = %job.id,
            slot = event.line.slot,
            number,
            "Call event queued"
        );
        Ok(Some(job))
    }
}
