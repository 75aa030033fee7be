//! Message log port.
//!
//! Append-only storage for the borrower/manager message history. The only
//! destructive operation is the automated-message sweep used by conversation
//! deletion, which must leave borrower and manager messages untouched.

use async_trait::async_trait;

use crate::domain::conversation::Message;
use crate::domain::foundation::{BorrowerId, DomainError};

#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Appends one message to the log.
    async fn append(&self, message: Message) -> Result<(), DomainError>;

    /// Returns the full history for a borrower, oldest first.
    async fn messages_for_borrower(
        &self,
        borrower_id: &BorrowerId,
    ) -> Result<Vec<Message>, DomainError>;

    /// Returns the most recent `limit` messages for a borrower, oldest
    /// first within the window.
    async fn tail(
        &self,
        borrower_id: &BorrowerId,
        limit: usize,
    ) -> Result<Vec<Message>, DomainError>;

    /// Removes every automated message for the borrower and returns how
    /// many were removed. Borrower-authored and manager-authored messages
    /// are preserved.
    async fn delete_automated(&self, borrower_id: &BorrowerId) -> Result<usize, DomainError>;
}
