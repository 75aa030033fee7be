//! In-memory notification sink for testing.
//!
//! # Panics
//!
//! Methods may panic if internal locks are poisoned. Acceptable for test
//! code; not for production use.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ManagerId, Notification};
use crate::ports::NotificationSink;

pub struct InMemoryNotificationSink {
    delivered: RwLock<Vec<(ManagerId, Notification)>>,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self {
            delivered: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns all delivered notifications (for test assertions).
    pub fn delivered(&self) -> Vec<(ManagerId, Notification)> {
        self.delivered
            .read()
            .expect("InMemoryNotificationSink: lock poisoned")
            .clone()
    }

    /// Counts notifications whose title contains `needle`.
    pub fn count_titled(&self, needle: &str) -> usize {
        self.delivered
            .read()
            .expect("InMemoryNotificationSink: lock poisoned")
            .iter()
            .filter(|(_, n)| n.title.contains(needle))
            .count()
    }
}

impl Default for InMemoryNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(
        &self,
        manager_id: &ManagerId,
        notification: Notification,
    ) -> Result<(), DomainError> {
        self.delivered
            .write()
            .expect("InMemoryNotificationSink: lock poisoned")
            .push((*manager_id, notification));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_records_manager_and_payload() {
        let sink = InMemoryNotificationSink::new();
        let manager = ManagerId::new();
        sink.notify(&manager, Notification::plain("Crisis Alert", "borrower in distress"))
            .await
            .unwrap();

        let delivered = sink.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].0, manager);
        assert_eq!(sink.count_titled("Crisis"), 1);
    }
}
