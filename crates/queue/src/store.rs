use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use relay_common::error::AppError;
use relay_common::types::{JobStatus, NotificationJob};

/// Persistent store for notification jobs.
///
/// Every status transition is a compare-and-set UPDATE guarded on the
/// current status, so concurrent workers serialize per job while distinct
/// jobs proceed fully in parallel.
#[derive(Clone)]
pub struct JobStore {
    pool: SqlitePool,
}

/// Raw row shape; status and id are stored as text.
#[derive(sqlx::FromRow)]
struct JobRow {
    id: String,
    slot: i64,
    text: String,
    status: String,
    attempt_count: i64,
    next_attempt_at: DateTime<Utc>,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for NotificationJob {
    type Error = AppError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(NotificationJob {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| AppError::Internal(format!("corrupt job id {}: {e}", row.id)))?,
            slot: row.slot as u8,
            text: row.text,
            status: row
                .status
                .parse::<JobStatus>()
                .map_err(AppError::Internal)?,
            attempt_count: row.attempt_count as u32,
            next_attempt_at: row.next_attempt_at,
            last_error: row.last_error,
            created_at: row.created_at,
            delivered_at: row.delivered_at,
        })
    }
}

const JOB_COLUMNS: &str =
    "id, slot, text, status, attempt_count, next_attempt_at, last_error, created_at, delivered_at";

impl JobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create and persist a new pending job, due immediately.
    ///
    /// Each event gets its own job; identical text enqueued twice yields two
    /// independent jobs (at-least-once, not exactly-once, delivery).
    pub async fn enqueue(&self, slot: u8, text: &str) -> Result<NotificationJob, AppError> {
        let job = NotificationJob {
            id: Uuid::new_v4(),
            slot,
            text: text.to_string(),
            status: JobStatus::Pending,
            attempt_count: 0,
            next_attempt_at: Utc::now(),
            last_error: None,
            created_at: Utc::now(),
            delivered_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO notification_jobs (id, slot, text, status, attempt_count, next_attempt_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.id.to_string())
        .bind(job.slot as i64)
        .bind(&job.text)
        .bind(job.status.to_string())
        .bind(job.attempt_count as i64)
        .bind(job.next_attempt_at)
        .bind(job.created_at)
        .execute(&self.pool)
        .await?;

        Ok(job)
    }

    /// Claim up to `limit` due pending jobs, transitioning each to
    /// Attempting. A job lost to a concurrent claimer is skipped.
    pub async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<NotificationJob>, AppError> {
        let rows: Vec<JobRow> = sqlx::query_as(&format!(
            r#"
            SELECT {JOB_COLUMNS} FROM notification_jobs
            WHERE status = 'pending' AND next_attempt_at <= ?
            ORDER BY next_attempt_at
            LIMIT ?
            "#
        ))
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut claimed = Vec::with_capacity(rows.len());
        for row in rows {
            let result =
                sqlx::query("UPDATE notification_jobs SET status = 'attempting' WHERE id = ? AND status = 'pending'")
                    .bind(&row.id)
                    .execute(&self.pool)
                    .await?;

            if result.rows_affected() == 1 {
                let mut job = NotificationJob::try_from(row)?;
                job.status = JobStatus::Attempting;
                claimed.push(job);
            }
        }

        Ok(claimed)
    }

    /// Attempting → Delivered (terminal).
    pub async fn mark_delivered(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE notification_jobs SET status = 'delivered', delivered_at = ?, last_error = NULL WHERE id = ? AND status = 'attempting'",
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Attempting → Pending with an incremented attempt count and a new due
    /// time computed by the worker's backoff policy.
    pub async fn mark_retry(
        &self,
        id: Uuid,
        attempt_count: u32,
        next_attempt_at: DateTime<Utc>,
        reason: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE notification_jobs
            SET status = 'pending', attempt_count = ?, next_attempt_at = ?, last_error = ?
            WHERE id = ? AND status = 'attempting'
            "#,
        )
        .bind(attempt_count as i64)
        .bind(next_attempt_at)
        .bind(reason)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Attempting → Abandoned (terminal).
    pub async fn mark_abandoned(&self, id: Uuid, reason: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE notification_jobs SET status = 'abandoned', last_error = ? WHERE id = ? AND status = 'attempting'",
        )
        .bind(reason)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Reset jobs stranded in Attempting by a process restart.
    pub async fn recover_interrupted(&self) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notification_jobs SET status = 'pending' WHERE status = 'attempting'",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Drop a non-terminal job. Removing the row aborts any pending backoff
    /// wait; the due-time poll simply never sees the job again.
    pub async fn cancel(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM notification_jobs WHERE id = ? AND status IN ('pending', 'attempting')",
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn fetch(&self, id: Uuid) -> Result<Option<NotificationJob>, AppError> {
        let row: Option<JobRow> = sqlx::query_as(&format!(
            "SELECT {JOB_COLUMNS} FROM notification_jobs WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(NotificationJob::try_from).transpose()
    }

    /// Most recently created jobs, for host UI display.
    pub async fn recent(&self, limit: u32) -> Result<Vec<NotificationJob>, AppError> {
        let rows: Vec<JobRow> = sqlx::query_as(&format!(
            "SELECT {JOB_COLUMNS} FROM notification_jobs ORDER BY created_at DESC LIMIT ?"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(NotificationJob::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_common::db::create_pool;

    async fn test_store() -> (JobStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("jobs.db").display());
        let pool = create_pool(&url, 5).await.unwrap();
        sqlx::migrate!("../../migrations").run(&pool).await.unwrap();
        (JobStore::new(pool), dir)
    }

    #[tokio::test]
    async fn test_enqueue_and_fetch() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(0, "hello").await.unwrap();

        let fetched = store.fetch(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.slot, 0);
        assert_eq!(fetched.text, "hello");
        assert_eq!(fetched.status, JobStatus::Pending);
        assert_eq!(fetched.attempt_count, 0);
    }

    #[tokio::test]
    async fn test_same_text_twice_makes_independent_jobs() {
        let (store, _dir) = test_store().await;
        let a = store.enqueue(0, "same").await.unwrap();
        let b = store.enqueue(0, "same").await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.recent(10).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_claim_due_transitions_to_attempting() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(1, "due now").await.unwrap();

        let claimed = store.claim_due(Utc::now(), 10).await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].id, job.id);
        assert_eq!(claimed[0].status, JobStatus::Attempting);

        // A second claim finds nothing.
        assert!(store.claim_due(Utc::now(), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claim_due_skips_future_jobs() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(0, "retry later").await.unwrap();
        let claimed = store.claim_due(Utc::now(), 10).await.unwrap();
        assert_eq!(claimed.len(), 1);

        let later = Utc::now() + chrono::Duration::seconds(30);
        store
            .mark_retry(job.id, 1, later, "HTTP 502")
            .await
            .unwrap();

        assert!(store.claim_due(Utc::now(), 10).await.unwrap().is_empty());
        let reclaimed = store.claim_due(later, 10).await.unwrap();
        assert_eq!(reclaimed.len(), 1);
        assert_eq!(reclaimed[0].attempt_count, 1);
        assert_eq!(reclaimed[0].last_error.as_deref(), Some("HTTP 502"));
    }

    #[tokio::test]
    async fn test_mark_delivered_is_terminal() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(0, "deliver me").await.unwrap();
        store.claim_due(Utc::now(), 10).await.unwrap();

        assert!(store.mark_delivered(job.id).await.unwrap());
        let fetched = store.fetch(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Delivered);
        assert!(fetched.delivered_at.is_some());

        // No transition leaves a terminal state.
        assert!(!store.mark_abandoned(job.id, "late").await.unwrap());
        assert!(
            !store
                .mark_retry(job.id, 1, Utc::now(), "late")
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_mark_abandoned_records_reason() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(0, "doomed").await.unwrap();
        store.claim_due(Utc::now(), 10).await.unwrap();

        assert!(store.mark_abandoned(job.id, "HTTP 401: Unauthorized").await.unwrap());
        let fetched = store.fetch(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Abandoned);
        assert_eq!(fetched.last_error.as_deref(), Some("HTTP 401: Unauthorized"));
    }

    #[tokio::test]
    async fn test_transition_guards_require_attempting() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(0, "still pending").await.unwrap();

        assert!(!store.mark_delivered(job.id).await.unwrap());
        assert!(!store.mark_abandoned(job.id, "nope").await.unwrap());
        assert_eq!(
            store.fetch(job.id).await.unwrap().unwrap().status,
            JobStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_recover_interrupted_requeues_attempting() {
        let (store, _dir) = test_store().await;
        store.enqueue(0, "was in flight").await.unwrap();
        store.claim_due(Utc::now(), 10).await.unwrap();

        assert_eq!(store.recover_interrupted().await.unwrap(), 1);
        assert_eq!(store.claim_due(Utc::now(), 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_drops_pending_job() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(0, "cancel me").await.unwrap();

        assert!(store.cancel(job.id).await.unwrap());
        assert!(store.fetch(job.id).await.unwrap().is_none());
        assert!(!store.cancel(job.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_cancel_leaves_terminal_jobs() {
        let (store, _dir) = test_store().await;
        let job = store.enqueue(0, "done").await.unwrap();
        store.claim_due(Utc::now(), 10).await.unwrap();
        store.mark_delivered(job.id).await.unwrap();

        assert!(!store.cancel(job.id).await.unwrap());
        assert!(store.fetch(job.id).await.unwrap().is_some());
    }
}
