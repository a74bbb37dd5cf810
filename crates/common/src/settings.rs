//! Routing-settings seam.
//!
//! The bot token and per-slot channel mapping are owned by an external
//! settings collaborator. The dispatch queue reads them fresh before every
//! delivery attempt so edits apply to in-flight retries. Absent or malformed
//! settings degrade to the empty default, which the queue treats as a
//! configuration failure for the affected job.

use std::path::{Path, PathBuf};

use crate::types::RoutingSettings;

/// Read-only access to the current routing configuration.
pub trait SettingsSource: Send + Sync {
    fn current(&self) -> RoutingSettings;
}

/// Settings backed by a JSON file maintained by the host settings UI.
pub struct FileSettingsSource {
    path: PathBuf,
}

impl FileSettingsSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SettingsSource for FileSettingsSource {
    fn current(&self) -> RoutingSettings {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "Settings file unreadable, using defaults"
                );
                return RoutingSettings::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Malformed settings file, using defaults"
            );
            RoutingSettings::default()
        })
    }
}
