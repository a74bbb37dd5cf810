//! Notification text formatting.
//!
//! Fixed per-event-kind templates in the bot API's HTML parse mode.
//! User-supplied content (message bodies, phone numbers) is embedded
//! verbatim, without escaping markup-significant characters; the delivered
//! text mirrors the device exactly.

use relay_common::types::{ClassifiedEvent, EventKind};

use crate::passcode;

/// Render the final notification text for a classified event.
/// Pure and total; there is no failure path for any input.
pub fn format_event(event: &ClassifiedEvent) -> String {
    match &event.kind {
        EventKind::Sms { sender, body } => {
            let mut text = format!("<blockquote>{body}</blockquote>");
            if let Some(code) = passcode::extract(body) {
                text.push_str(&format!("\n\n🔑 Code: <code>{code}</code>"));
            }
            text.push_str(&format!(
                "\n\n📱 {} from <code>{sender}</code>",
                event.line.label
            ));
            text
        }
        EventKind::Call { number } => {
            format!("📞 {} from <code>{number}</code>", event.line.label)
        }
    }
}
