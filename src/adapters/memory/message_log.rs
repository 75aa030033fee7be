//! In-memory message log for testing.
//!
//! # Panics
//!
//! Methods may panic if internal locks are poisoned. Acceptable for test
//! code; not for production use.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::conversation::Message;
use crate::domain::foundation::{BorrowerId, DomainError};
use crate::ports::MessageLog;

pub struct InMemoryMessageLog {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(Vec::new()),
        }
    }

    // === Test Helpers ===

    /// Returns every stored message (for test assertions).
    pub fn all(&self) -> Vec<Message> {
        self.messages
            .read()
            .expect("InMemoryMessageLog: lock poisoned")
            .clone()
    }

    /// Counts automated messages for a borrower.
    pub fn automated_count(&self, borrower_id: &BorrowerId) -> usize {
        self.messages
            .read()
            .expect("InMemoryMessageLog: lock poisoned")
            .iter()
            .filter(|m| m.borrower_id() == borrower_id && m.is_automated())
            .count()
    }
}

impl Default for InMemoryMessageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, message: Message) -> Result<(), DomainError> {
        self.messages
            .write()
            .expect("InMemoryMessageLog: lock poisoned")
            .push(message);
        Ok(())
    }

    async fn messages_for_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Vec<Message>, DomainError> {
        Ok(self
            .messages
            .read()
            .expect("InMemoryMessageLog: lock poisoned")
            .iter()
            .filter(|m| m.borrower_id() == borrower_id)
            .cloned()
            .collect())
    }

    async fn tail(
        &self,
        borrower_id: &BorrowerId,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError> {
        let mut history = self.messages_for_borrower(borrower_id).await?;
        if history.len() > limit {
            history.drain(..history.len() - limit);
        }
        Ok(history)
    }

    async fn delete_automated(&self, borrower_id: &BorrowerId) -> Result<usize, DomainError> {
        let mut messages = self
            .messages
            .write()
            .expect("InMemoryMessageLog: lock poisoned");
        let before = messages.len();
        messages.retain(|m| !(m.borrower_id() == borrower_id && m.is_automated()));
        Ok(before - messages.len())
    }
}
