//! Conversation queries and deletion.

use std::sync::Arc;
use tracing::info;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{BorrowerId, ConversationId, DomainError, ErrorCode};
use crate::ports::{ConversationRepository, MessageLog};

use crate::application::locks::BorrowerLocks;

/// Conversation with its full message history.
#[derive(Debug, Clone)]
pub struct ConversationView {
    pub conversation: Conversation,
    pub messages: Vec<Message>,
}

pub struct ListConversationsHandler {
    conversations: Arc<dyn ConversationRepository>,
}

impl ListConversationsHandler {
    pub fn new(conversations: Arc<dyn ConversationRepository>) -> Self {
        Self { conversations }
    }

    /// Active conversations, most recently updated first.
    pub async fn handle(&self) -> Result<Vec<Conversation>, DomainError> {
        self.conversations.list_active().await
    }
}

pub struct GetConversationHandler {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageLog>,
}

impl GetConversationHandler {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageLog>,
    ) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    pub async fn handle(&self, id: &ConversationId) -> Result<ConversationView, DomainError> {
        let conversation = self
            .conversations
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ConversationNotFound,
                    format!("Conversation {id} not found"),
                )
            })?;
        let messages = self
            .messages
            .messages_for_borrower(conversation.borrower_id())
            .await?;
        Ok(ConversationView {
            conversation,
            messages,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSummary {
    pub conversation_removed: bool,
    pub automated_messages_removed: usize,
}

pub struct DeleteConversationHandler {
    conversations: Arc<dyn ConversationRepository>,
    messages: Arc<dyn MessageLog>,
    locks: Arc<BorrowerLocks>,
}

impl DeleteConversationHandler {
    pub fn new(
        conversations: Arc<dyn ConversationRepository>,
        messages: Arc<dyn MessageLog>,
        locks: Arc<BorrowerLocks>,
    ) -> Self {
        Self {
            conversations,
            messages,
            locks,
        }
    }

    /// Removes the borrower's conversation record and every automated
    /// message. Borrower-authored and manager-authored messages survive.
    ///
    /// Runs under the borrower's lock so a concurrent reply cannot observe
    /// a half-deleted conversation.
    pub async fn handle(&self, borrower_id: &BorrowerId) -> Result<DeleteSummary, DomainError> {
        let _guard = self.locks.acquire(borrower_id).await;

        let conversation_removed = self.conversations.delete_by_borrower(borrower_id).await?;
        let automated_messages_removed = self.messages.delete_automated(borrower_id).await?;

        info!(
            borrower_id = %borrower_id,
            conversation_removed,
            automated_messages_removed,
            "conversation deleted"
        );
        Ok(DeleteSummary {
            conversation_removed,
            automated_messages_removed,
        })
    }
}
