//! In-memory conversation repository for testing.
//!
//! Enforces the one-active-conversation-per-borrower invariant the same way
//! a relational adapter would with a partial unique index.
//!
//! # Panics
//!
//! Methods may panic if internal locks are poisoned. Acceptable for test
//! code; not for production use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::conversation::Conversation;
use crate::domain::foundation::{BorrowerId, ConversationId, DomainError, ErrorCode};
use crate::ports::ConversationRepository;

pub struct InMemoryConversationRepository {
    conversations: RwLock<HashMap<ConversationId, Conversation>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }

    // === Test Helpers ===

    /// Returns the stored record count (for test assertions).
    pub fn count(&self) -> usize {
        self.conversations
            .read()
            .expect("InMemoryConversationRepository: lock poisoned")
            .len()
    }
}

impl Default for InMemoryConversationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn save(&self, conversation: Conversation) -> Result<(), DomainError> {
        let mut conversations = self
            .conversations
            .write()
            .expect("InMemoryConversationRepository: lock poisoned");

        if conversation.is_active() {
            let duplicate = conversations.values().any(|c| {
                c.borrower_id() == conversation.borrower_id()
                    && c.is_active()
                    && c.id() != conversation.id()
            });
            if duplicate {
                return Err(DomainError::new(
                    ErrorCode::DuplicateActiveConversation,
                    format!(
                        "Borrower {} already has an active conversation",
                        conversation.borrower_id()
                    ),
                ));
            }
        }

        conversations.insert(*conversation.id(), conversation);
        Ok(())
    }

    async fn update(&self, conversation: Conversation) -> Result<(), DomainError> {
        let mut conversations = self
            .conversations
            .write()
            .expect("InMemoryConversationRepository: lock poisoned");
        if !conversations.contains_key(conversation.id()) {
            return Err(DomainError::new(
                ErrorCode::ConversationNotFound,
                format!("Conversation {} not found", conversation.id()),
            ));
        }
        conversations.insert(*conversation.id(), conversation);
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, DomainError> {
        Ok(self
            .conversations
            .read()
            .expect("InMemoryConversationRepository: lock poisoned")
            .get(id)
            .cloned())
    }

    async fn find_active_by_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Option<Conversation>, DomainError> {
        Ok(self
            .conversations
            .read()
            .expect("InMemoryConversationRepository: lock poisoned")
            .values()
            .find(|c| c.borrower_id() == borrower_id && c.is_active())
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Conversation>, DomainError> {
        let mut active: Vec<Conversation> = self
            .conversations
            .read()
            .expect("InMemoryConversationRepository: lock poisoned")
            .values()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| {
            b.updated_at()
                .as_datetime()
                .cmp(&a.updated_at().as_datetime())
        });
        Ok(active)
    }

    async fn delete_by_borrower(&self, borrower_id: &BorrowerId) -> Result<bool, DomainError> {
        let mut conversations = self
            .conversations
            .write()
            .expect("InMemoryConversationRepository: lock poisoned");
        let before = conversations.len();
        conversations.retain(|_, c| c.borrower_id() != borrower_id);
        Ok(conversations.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ConversationPhase;

    #[tokio::test]
    async fn save_then_find_active_round_trips() {
        let repo = InMemoryConversationRepository::new();
        let borrower = BorrowerId::new();
        let conversation = Conversation::start(borrower);
        let id = *conversation.id();
        repo.save(conversation).await.unwrap();

        let found = repo.find_active_by_borrower(&borrower).await.unwrap();
        assert_eq!(found.map(|c| *c.id()), Some(id));
    }

    #[tokio::test]
    async fn second_active_conversation_for_borrower_conflicts() {
        let repo = InMemoryConversationRepository::new();
        let borrower = BorrowerId::new();
        repo.save(Conversation::start(borrower)).await.unwrap();

        let err = repo.save(Conversation::start(borrower)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateActiveConversation);
    }

    #[tokio::test]
    async fn closed_conversation_allows_a_new_active_one() {
        let repo = InMemoryConversationRepository::new();
        let borrower = BorrowerId::new();
        let mut first = Conversation::start(borrower);
        first.advance(ConversationPhase::LoanClosed).unwrap();
        repo.save(first).await.unwrap();

        assert!(repo.save(Conversation::start(borrower)).await.is_ok());
    }

    #[tokio::test]
    async fn update_requires_existing_record() {
        let repo = InMemoryConversationRepository::new();
        let err = repo
            .update(Conversation::start(BorrowerId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversationNotFound);
    }

    #[tokio::test]
    async fn delete_by_borrower_reports_whether_record_existed() {
        let repo = InMemoryConversationRepository::new();
        let borrower = BorrowerId::new();
        repo.save(Conversation::start(borrower)).await.unwrap();

        assert!(repo.delete_by_borrower(&borrower).await.unwrap());
        assert!(!repo.delete_by_borrower(&borrower).await.unwrap());
        assert_eq!(repo.count(), 0);
    }

    #[tokio::test]
    async fn list_active_excludes_terminal_conversations() {
        let repo = InMemoryConversationRepository::new();
        repo.save(Conversation::start(BorrowerId::new())).await.unwrap();
        let mut closed = Conversation::start(BorrowerId::new());
        closed.advance(ConversationPhase::LoanClosed).unwrap();
        repo.save(closed).await.unwrap();

        assert_eq!(repo.list_active().await.unwrap().len(), 1);
    }
}
