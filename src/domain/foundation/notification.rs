//! Structured notifications for human-manager visibility.
//!
//! The engine emits these through the [`NotificationSink`] port whenever
//! something needs a human eye: crisis escalations, batch completion
//! summaries, negotiations that exhausted automatic revision.
//!
//! [`NotificationSink`]: crate::ports::NotificationSink

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::Timestamp;

/// A structured event for the external notification sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Short headline, e.g. "Crisis escalation".
    pub title: String,

    /// Human-readable body.
    pub message: String,

    /// Arbitrary related data (borrower id, batch counts, ...).
    pub related: JsonValue,

    /// When the notification was created.
    pub created_at: Timestamp,
}

impl Notification {
    /// Creates a notification with related structured data.
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        related: JsonValue,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            related,
            created_at: Timestamp::now(),
        }
    }

    /// Creates a notification without related data.
    pub fn plain(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title, message, JsonValue::Null)
    }
}
