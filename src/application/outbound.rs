//! Shared outbound messaging path.
//!
//! Builds the automated message, dispatches it, and appends it to the log
//! only once the channel accepted it. Borrowers without a phone number get
//! the message logged but never dispatched, so manager dashboards still see
//! what the engine intended to say.

use std::sync::Arc;
use tracing::warn;

use crate::domain::borrower::Borrower;
use crate::domain::conversation::{ConversationPhase, Message};
use crate::domain::foundation::{DomainError, ManagerId};
use crate::domain::plan::PlanPair;
use crate::ports::MessageLog;

use super::dispatcher::DeliveryDispatcher;

pub struct Outbound {
    message_log: Arc<dyn MessageLog>,
    dispatcher: Arc<DeliveryDispatcher>,
}

impl Outbound {
    pub fn new(message_log: Arc<dyn MessageLog>, dispatcher: Arc<DeliveryDispatcher>) -> Self {
        Self {
            message_log,
            dispatcher,
        }
    }

    /// Sends an automated message to the borrower and appends it to the log.
    ///
    /// Dispatch happens before the append: a message the gateway rejected
    /// permanently is never logged, and the caller sees the delivery error.
    pub async fn send_automated(
        &self,
        borrower: &Borrower,
        manager_id: ManagerId,
        content: String,
        phase: ConversationPhase,
        plans: Option<PlanPair>,
    ) -> Result<Message, DomainError> {
        let mut message = Message::automated(borrower.id, manager_id, content, phase)?;
        if let Some(pair) = plans {
            message = message.with_plans(pair);
        }

        match &borrower.phone_number {
            Some(number) => {
                self.dispatcher
                    .dispatch(*message.id(), number, message.content())
                    .await?;
            }
            None => {
                warn!(borrower_id = %borrower.id, "borrower has no phone number, message logged only");
            }
        }

        self.message_log.append(message.clone()).await?;
        Ok(message)
    }

    pub fn dispatcher(&self) -> &DeliveryDispatcher {
        &self.dispatcher
    }
}
