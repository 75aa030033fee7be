//! Outbound delivery channel port.
//!
//! Abstraction over SMS-style gateways. Implementations classify failures as
//! transient or permanent so the dispatcher knows whether to retry.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::delivery::{DeliveryStatus, StatusUpdate};

/// Failure modes of an outbound channel.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Retryable: timeouts, rate limits, gateway 5xx.
    #[error("transient channel failure: {0}")]
    Transient(String),

    /// Not retryable: invalid destination, auth failure, rejected content.
    #[error("permanent channel failure ({code}): {message}")]
    Permanent { code: String, message: String },
}

impl ChannelError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ChannelError::Transient(_))
    }
}

/// Result of a successful hand-off to the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// Identifier assigned by the external gateway.
    pub external_id: String,
    /// Status at hand-off time, usually `Sent`.
    pub status: DeliveryStatus,
}

#[async_trait]
pub trait OutboundChannel: Send + Sync {
    /// Sends one message to a destination number.
    async fn send(&self, to: &str, body: &str) -> Result<DispatchReceipt, ChannelError>;

    /// Fetches the current delivery status for a previously dispatched
    /// message.
    async fn fetch_status(&self, external_id: &str) -> Result<StatusUpdate, ChannelError>;

    /// Short channel name used in attempt records and logs.
    fn channel_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_channel_is_object_safe() {
        fn _accepts_dyn(_channel: &dyn OutboundChannel) {}
    }

    #[test]
    fn transient_errors_are_flagged_retryable() {
        assert!(ChannelError::Transient("timeout".to_string()).is_transient());
        assert!(!ChannelError::Permanent {
            code: "21211".to_string(),
            message: "invalid number".to_string(),
        }
        .is_transient());
    }
}
