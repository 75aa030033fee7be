//! Conversation repository port.

use async_trait::async_trait;

use crate::domain::conversation::Conversation;
use crate::domain::foundation::{BorrowerId, ConversationId, DomainError};

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Persists a new conversation.
    ///
    /// # Errors
    ///
    /// - `DuplicateActiveConversation` if the borrower already has an
    ///   active conversation
    async fn save(&self, conversation: Conversation) -> Result<(), DomainError>;

    /// Persists changes to an existing conversation.
    ///
    /// # Errors
    ///
    /// - `ConversationNotFound` if the conversation does not exist
    async fn update(&self, conversation: Conversation) -> Result<(), DomainError>;

    /// Finds a conversation by id.
    async fn find_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, DomainError>;

    /// Finds the borrower's active (non-terminal) conversation, if any.
    async fn find_active_by_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Option<Conversation>, DomainError>;

    /// Lists all active conversations, most recently updated first.
    async fn list_active(&self) -> Result<Vec<Conversation>, DomainError>;

    /// Deletes the borrower's conversation record. Returns true if a record
    /// existed.
    async fn delete_by_borrower(&self, borrower_id: &BorrowerId) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ConversationRepository) {}
    }
}
