//! Demo delivery channel.
//!
//! Stands in for the real gateway when SMS is disabled, forced into demo
//! mode, or missing credentials. Every send succeeds immediately with a
//! synthetic external id so the rest of the pipeline behaves exactly as it
//! would in production.

use async_trait::async_trait;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::domain::delivery::{DeliveryStatus, StatusUpdate};
use crate::ports::{ChannelError, DispatchReceipt, OutboundChannel};

use super::normalize_number;

pub struct DemoChannel {
    sent: RwLock<Vec<(String, String)>>,
}

impl DemoChannel {
    pub fn new() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns (destination, body) pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .read()
            .expect("DemoChannel: lock poisoned")
            .clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().expect("DemoChannel: lock poisoned").len()
    }
}

impl Default for DemoChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OutboundChannel for DemoChannel {
    async fn send(&self, to: &str, body: &str) -> Result<DispatchReceipt, ChannelError> {
        let destination = normalize_number(to);
        let external_id = format!("demo-{}", Uuid::new_v4());
        info!(
            to = %destination,
            external_id = %external_id,
            chars = body.len(),
            "demo SMS delivered"
        );
        self.sent
            .write()
            .expect("DemoChannel: lock poisoned")
            .push((destination, body.to_string()));
        Ok(DispatchReceipt {
            external_id,
            status: DeliveryStatus::Delivered,
        })
    }

    async fn fetch_status(&self, _external_id: &str) -> Result<StatusUpdate, ChannelError> {
        Ok(StatusUpdate {
            status: DeliveryStatus::Delivered,
            error_code: None,
        })
    }

    fn channel_name(&self) -> &'static str {
        "demo"
    }
}
