//! Delivery dispatcher.
//!
//! Owns the outbound channel and the per-message attempt registry. Transient
//! channel failures are retried with a fixed pause up to the configured
//! attempt budget; permanent failures surface immediately with the gateway
//! error code. Status updates apply idempotently.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::delivery::{DeliveryAttempt, DeliveryStatus, StatusUpdate};
use crate::domain::foundation::{DomainError, ErrorCode, MessageId};
use crate::ports::{ChannelError, OutboundChannel};

pub struct DeliveryDispatcher {
    channel: Arc<dyn OutboundChannel>,
    attempts: RwLock<HashMap<MessageId, DeliveryAttempt>>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl DeliveryDispatcher {
    pub fn new(channel: Arc<dyn OutboundChannel>, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            channel,
            attempts: RwLock::new(HashMap::new()),
            // A zero budget would never send anything.
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Sends one message and records the delivery attempt.
    ///
    /// # Errors
    ///
    /// - `GatewayTransient` when every retry of a retryable failure is
    ///   exhausted
    /// - `GatewayPermanent` when the channel rejects the message outright
    pub async fn dispatch(
        &self,
        message_id: MessageId,
        to: &str,
        body: &str,
    ) -> Result<DeliveryAttempt, DomainError> {
        let mut tries = 0u32;
        loop {
            tries += 1;
            match self.channel.send(to, body).await {
                Ok(receipt) => {
                    let attempt = DeliveryAttempt::new(
                        message_id,
                        self.channel.channel_name(),
                        receipt.external_id,
                        receipt.status,
                        tries,
                    );
                    debug!(
                        message_id = %message_id,
                        external_id = %attempt.external_id,
                        tries,
                        "message dispatched"
                    );
                    self.record(attempt.clone());
                    return Ok(attempt);
                }
                Err(err) if err.is_transient() && tries < self.max_attempts => {
                    warn!(message_id = %message_id, tries, error = %err, "transient send failure, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(ChannelError::Permanent { code, message }) => {
                    self.record_failure(message_id, tries, Some(code.clone()));
                    return Err(DomainError::new(
                        ErrorCode::GatewayPermanent,
                        format!("Delivery rejected: {message}"),
                    )
                    .with_detail("gateway_code", code));
                }
                Err(err) => {
                    self.record_failure(message_id, tries, None);
                    return Err(DomainError::new(
                        ErrorCode::GatewayTransient,
                        format!("Delivery failed after {tries} tries: {err}"),
                    ));
                }
            }
        }
    }

    /// Applies an asynchronous status report for a dispatched message.
    /// Returns true when the attempt record changed.
    ///
    /// # Errors
    ///
    /// - `NotFound` when no attempt is registered for the message
    pub fn apply_status_update(
        &self,
        message_id: &MessageId,
        update: &StatusUpdate,
    ) -> Result<bool, DomainError> {
        let mut attempts = self
            .attempts
            .write()
            .expect("DeliveryDispatcher: attempts lock poisoned");
        let attempt = attempts.get_mut(message_id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("No delivery attempt recorded for message {message_id}"),
            )
        })?;
        Ok(attempt.apply_update(update))
    }

    /// Polls the channel for the current status of a dispatched message and
    /// applies the result.
    pub async fn poll_status(&self, message_id: &MessageId) -> Result<DeliveryAttempt, DomainError> {
        let external_id = self
            .attempt_for(message_id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("No delivery attempt recorded for message {message_id}"),
                )
            })?
            .external_id;

        let update = self
            .channel
            .fetch_status(&external_id)
            .await
            .map_err(|err| match err {
                ChannelError::Transient(msg) => {
                    DomainError::new(ErrorCode::GatewayTransient, msg)
                }
                ChannelError::Permanent { code, message } => {
                    DomainError::new(ErrorCode::GatewayPermanent, message)
                        .with_detail("gateway_code", code)
                }
            })?;
        self.apply_status_update(message_id, &update)?;
        self.attempt_for(message_id).ok_or_else(|| {
            DomainError::new(ErrorCode::InternalError, "Attempt record vanished during poll")
        })
    }

    /// Returns the attempt record for a message, if one exists.
    pub fn attempt_for(&self, message_id: &MessageId) -> Option<DeliveryAttempt> {
        self.attempts
            .read()
            .expect("DeliveryDispatcher: attempts lock poisoned")
            .get(message_id)
            .cloned()
    }

    fn record(&self, attempt: DeliveryAttempt) {
        self.attempts
            .write()
            .expect("DeliveryDispatcher: attempts lock poisoned")
            .insert(attempt.message_id, attempt);
    }

    fn record_failure(&self, message_id: MessageId, tries: u32, error_code: Option<String>) {
        let mut attempt = DeliveryAttempt::new(
            message_id,
            self.channel.channel_name(),
            String::new(),
            DeliveryStatus::Failed,
            tries,
        );
        attempt.error_code = error_code;
        self.record(attempt);
    }
}
