use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logical communication line backed by one subscription slot on the device.
///
/// Immutable snapshot produced by the line registry at lookup time. `slot` is
/// the stable routing key; the descriptive fields are best-effort and fall
/// back to positional defaults when telephony metadata is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub slot: u8,
    pub label: String,
    pub carrier: String,
    pub number: Option<String>,
}

/// Platform phone-state values as reported by the host call listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallState {
    Ringing,
    Offhook,
    Idle,
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallState::Ringing => write!(f, "ringing"),
            CallState::Offhook => write!(f, "offhook"),
            CallState::Idle => write!(f, "idle"),
        }
    }
}

/// A telephony event as reported by a host event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Sms { sender: String, body: String },
    Call { number: String },
}

/// An event with its originating line resolved. Consumed exactly once by the
/// formatter; never stored beyond the job it produces.
#[derive(Debug, Clone)]
pub struct ClassifiedEvent {
    pub line: Line,
    pub kind: EventKind,
}

/// Lifecycle of a notification job.
///
/// `Delivered` and `Abandoned` are terminal; no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Attempting,
    Delivered,
    Abandoned,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Delivered | JobStatus::Abandoned)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Attempting => write!(f, "attempting"),
            JobStatus::Delivered => write!(f, "delivered"),
            JobStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "attempting" => Ok(JobStatus::Attempting),
            "delivered" => Ok(JobStatus::Delivered),
            "abandoned" => Ok(JobStatus::Abandoned),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// One durable unit of pending outbound notification work.
///
/// Owned exclusively by the dispatch queue from creation until terminal.
/// `attempt_count` counts completed delivery attempts that failed retryably.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationJob {
    pub id: Uuid,
    pub slot: u8,
    pub text: String,
    pub status: JobStatus,
    pub attempt_count: u32,
    pub next_attempt_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// Result of a single delivery attempt against the bot API.
///
/// Derived purely from one HTTP interaction; drives exactly one queue
/// transition and is never persisted beyond the job's `last_error` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    Retryable(String),
    Fatal(String),
}

/// Routing configuration supplied by the external settings collaborator.
///
/// Read fresh per delivery attempt so configuration changes apply to
/// in-flight retries. An empty token or a missing slot mapping is a
/// legitimate state, handled by the queue as a configuration failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingSettings {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub channel_by_slot: BTreeMap<u8, String>,
}
