//! Notification sink port.
//!
//! Side channel for manager-facing alerts: crisis escalations, batch
//! summaries, exhausted negotiations. Fire-and-forget from the caller's
//! point of view.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ManagerId, Notification};

#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers a notification to a manager.
    async fn notify(
        &self,
        manager_id: &ManagerId,
        notification: Notification,
    ) -> Result<(), DomainError>;
}
