//! Delivery attempt tracking.
//!
//! One `DeliveryAttempt` per dispatched message, mutated asynchronously as
//! status updates arrive from the outbound channel. Updates are idempotent:
//! re-applying the current status is a no-op and terminal statuses are never
//! downgraded.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AttemptId, MessageId, Timestamp};

/// Delivery status reported by the outbound channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Accepted by the dispatcher, not yet handed to the channel.
    #[default]
    Queued,
    /// Handed to the channel.
    Sent,
    /// Confirmed delivered to the destination.
    Delivered,
    /// Channel gave up; see error code.
    Failed,
    /// Destination rejected or unreachable.
    Undelivered,
}

impl DeliveryStatus {
    /// Terminal statuses never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliveryStatus::Delivered | DeliveryStatus::Failed | DeliveryStatus::Undelivered
        )
    }
}

/// Asynchronous status report for one external message id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: DeliveryStatus,
    pub error_code: Option<String>,
}

/// Record of one outbound dispatch, one-to-one with a sent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub id: AttemptId,
    pub message_id: MessageId,
    /// Channel name ("sms", "demo").
    pub channel: String,
    /// Identifier assigned by the external channel.
    pub external_id: String,
    pub status: DeliveryStatus,
    pub error_code: Option<String>,
    /// How many sends were tried before the channel accepted (or the
    /// dispatcher gave up).
    pub attempt_count: u32,
    pub updated_at: Timestamp,
}

impl DeliveryAttempt {
    /// Creates a fresh attempt record for a dispatched message.
    pub fn new(
        message_id: MessageId,
        channel: impl Into<String>,
        external_id: impl Into<String>,
        status: DeliveryStatus,
        attempt_count: u32,
    ) -> Self {
        Self {
            id: AttemptId::new(),
            message_id,
            channel: channel.into(),
            external_id: external_id.into(),
            status,
            error_code: None,
            attempt_count,
            updated_at: Timestamp::now(),
        }
    }

    /// Applies a status update idempotently.
    ///
    /// Returns true when the record changed. Re-applying the same status is
    /// a no-op, and a terminal status is never overwritten.
    pub fn apply_update(&mut self, update: &StatusUpdate) -> bool {
        if self.status.is_terminal() || self.status == update.status {
            return false;
        }
        self.status = update.status;
        self.error_code = update.error_code.clone();
        self.updated_at = Timestamp::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(status: DeliveryStatus) -> DeliveryAttempt {
        DeliveryAttempt::new(MessageId::new(), "sms", "SM123", status, 1)
    }

    #[test]
    fn applying_new_status_changes_record() {
        let mut a = attempt(DeliveryStatus::Sent);
        let changed = a.apply_update(&StatusUpdate {
            status: DeliveryStatus::Delivered,
            error_code: None,
        });
        assert!(changed);
        assert_eq!(a.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn reapplying_same_status_is_noop() {
        let mut a = attempt(DeliveryStatus::Sent);
        let update = StatusUpdate {
            status: DeliveryStatus::Sent,
            error_code: None,
        };
        assert!(!a.apply_update(&update));
    }

    #[test]
    fn terminal_status_is_never_downgraded() {
        let mut a = attempt(DeliveryStatus::Delivered);
        let changed = a.apply_update(&StatusUpdate {
            status: DeliveryStatus::Sent,
            error_code: None,
        });
        assert!(!changed);
        assert_eq!(a.status, DeliveryStatus::Delivered);
    }

    #[test]
    fn failure_update_records_error_code() {
        let mut a = attempt(DeliveryStatus::Sent);
        a.apply_update(&StatusUpdate {
            status: DeliveryStatus::Undelivered,
            error_code: Some("30003".to_string()),
        });
        assert_eq!(a.error_code.as_deref(), Some("30003"));
    }
}
