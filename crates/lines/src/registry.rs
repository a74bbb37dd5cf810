use std::collections::BTreeMap;
use std::sync::Arc;

use relay_common::types::Line;

use crate::source::{LineSubscription, TelephonySource};

/// Resolves subscription ids to lines, falling back to positional defaults
/// when the platform denies access or has no matching subscription.
pub struct LineRegistry {
    source: Arc<dyn TelephonySource>,
}

impl LineRegistry {
    pub fn new(source: Arc<dyn TelephonySource>) -> Self {
        Self { source }
    }

    /// Resolve the line for a subscription id. Never fails.
    ///
    /// An unknown id maps to slot 0, matching the host platform's behavior
    /// for events that arrive without a valid subscription.
    pub fn resolve(&self, subscription_id: i32) -> Line {
        let subscriptions = match self.source.active_lines() {
            Ok(subs) => subs,
            Err(e) => {
                tracing::debug!(error = %e, "Telephony metadata unavailable, using fallback line");
                return fallback_line(0);
            }
        };

        let slot = subscriptions
            .iter()
            .find(|s| s.subscription_id == subscription_id)
            .map(|s| s.slot)
            .unwrap_or(0);

        subscriptions
            .iter()
            .find(|s| s.slot == slot)
            .map(line_from_subscription)
            .unwrap_or_else(|| fallback_line(slot))
    }

    /// All known lines keyed by slot, for read-only display by the host UI.
    ///
    /// The dispatch pipeline never depends on this listing, only on per-id
    /// resolution.
    pub fn list(&self) -> BTreeMap<u8, Line> {
        match self.source.active_lines() {
            Ok(subs) => subs
                .iter()
                .map(|s| (s.slot, line_from_subscription(s)))
                .collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Telephony metadata unavailable, listing fallback lines");
                fallback_lines()
            }
        }
    }
}

fn line_from_subscription(sub: &LineSubscription) -> Line {
    Line {
        slot: sub.slot,
        label: sub.label.clone(),
        carrier: sub.carrier.clone(),
        number: sub.number.clone(),
    }
}

/// Synthetic line for a slot with no metadata: "Line 1" for slot 0, etc.
fn fallback_line(slot: u8) -> Line {
    Line {
        slot,
        label: format!("Line {}", slot + 1),
        carrier: "Unknown".to_string(),
        number: None,
    }
}

/// Dual-line fallback map shown when the platform reports nothing at all.
fn fallback_lines() -> BTreeMap<u8, Line> {
    [(0, fallback_line(0)), (1, fallback_line(1))].into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{StaticTelephonySource, UnavailableTelephonySource};

    fn registry_with(lines: Vec<LineSubscription>) -> LineRegistry {
        LineRegistry::new(Arc::new(StaticTelephonySource::new(lines)))
    }

    fn work_line() -> LineSubscription {
        LineSubscription {
            subscription_id: 7,
            slot: 1,
            label: "Work".to_string(),
            carrier: "ACME Mobile".to_string(),
            number: Some("+15550001".to_string()),
        }
    }

    #[test]
    fn test_resolve_known_subscription() {
        let registry = registry_with(vec![work_line()]);
        let line = registry.resolve(7);
        assert_eq!(line.slot, 1);
        assert_eq!(line.label, "Work");
        assert_eq!(line.carrier, "ACME Mobile");
    }

    #[test]
    fn test_resolve_unknown_subscription_falls_back_to_slot_zero() {
        let registry = registry_with(vec![work_line()]);
        let line = registry.resolve(999);
        assert_eq!(line.slot, 0);
        assert_eq!(line.label, "Line 1");
        assert_eq!(line.carrier, "Unknown");
        assert_eq!(line.number, None);
    }

    #[test]
    fn test_resolve_unavailable_source_falls_back() {
        let registry = LineRegistry::new(Arc::new(UnavailableTelephonySource));
        let line = registry.resolve(1);
        assert_eq!(line.slot, 0);
        assert_eq!(line.label, "Line 1");
    }

    #[test]
    fn test_list_keys_by_slot() {
        let mut other = work_line();
        other.subscription_id = 8;
        other.slot = 0;
        other.label = "Personal".to_string();
        let registry = registry_with(vec![work_line(), other]);

        let lines = registry.list();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.get(&0).unwrap().label, "Personal");
        assert_eq!(lines.get(&1).unwrap().label, "Work");
    }

    #[test]
    fn test_list_unavailable_source_yields_dual_fallback() {
        let registry = LineRegistry::new(Arc::new(UnavailableTelephonySource));
        let lines = registry.list();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.get(&0).unwrap().label, "Line 1");
        assert_eq!(lines.get(&1).unwrap().label, "Line 2");
    }

    #[test]
    fn test_list_empty_source_is_empty() {
        let registry = registry_with(vec![]);
        assert!(registry.list().is_empty());
    }
}
