use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One active telephony subscription as reported by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSubscription {
    pub subscription_id: i32,
    pub slot: u8,
    pub label: String,
    pub carrier: String,
    #[serde(default)]
    pub number: Option<String>,
}

#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("telephony metadata unavailable: {0}")]
    Unavailable(String),
}

/// Access to the platform's active subscription list.
///
/// Implementations must not block; the registry is called on the event path.
pub trait TelephonySource: Send + Sync {
    fn active_lines(&self) -> Result<Vec<LineSubscription>, TelephonyError>;
}

/// Subscription metadata loaded once from a host-provided JSON file.
pub struct StaticTelephonySource {
    lines: Vec<LineSubscription>,
}

impl StaticTelephonySource {
    pub fn new(lines: Vec<LineSubscription>) -> Self {
        Self { lines }
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let lines: Vec<LineSubscription> = serde_json::from_str(&raw)?;
        tracing::info!(
            path = %path.as_ref().display(),
            count = lines.len(),
            "Loaded line metadata"
        );
        Ok(Self::new(lines))
    }
}

impl TelephonySource for StaticTelephonySource {
    fn active_lines(&self) -> Result<Vec<LineSubscription>, TelephonyError> {
        Ok(self.lines.clone())
    }
}

/// Source used when the host grants no access to telephony metadata.
/// Every lookup degrades to the registry's fallback lines.
pub struct UnavailableTelephonySource;

impl TelephonySource for UnavailableTelephonySource {
    fn active_lines(&self) -> Result<Vec<LineSubscription>, TelephonyError> {
        Err(TelephonyError::Unavailable(
            "no line metadata configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_parses_subscriptions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        std::fs::write(
            &path,
            r#"[{"subscription_id": 3, "slot": 0, "label": "Work", "carrier": "ACME", "number": "+15550001"}]"#,
        )
        .unwrap();

        let source = StaticTelephonySource::from_file(&path).unwrap();
        let lines = source.active_lines().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].subscription_id, 3);
        assert_eq!(lines[0].slot, 0);
        assert_eq!(lines[0].number.as_deref(), Some("+15550001"));
    }

    #[test]
    fn test_from_file_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        std::fs::write(&path, "[{").unwrap();
        assert!(StaticTelephonySource::from_file(&path).is_err());
    }

    #[test]
    fn test_unavailable_source_errors() {
        assert!(UnavailableTelephonySource.active_lines().is_err());
    }
}
