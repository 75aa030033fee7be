//! Conversation record.
//!
//! An explicit per-borrower state record with a monotonically increasing
//! version counter. The original system inferred the conversation phase from
//! the latest message; keeping the state explicit and versioned lets all
//! mutation go through the per-borrower lock without races between inbound
//! processing and outbound generation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    BorrowerId, ConversationId, DomainError, ErrorCode, MessageId, StateMachine, Timestamp,
};

use super::ConversationPhase;

/// The per-borrower conversation state record.
///
/// # Invariants
///
/// - At most one active (non-terminal) conversation exists per borrower;
///   the repository enforces this on save.
/// - `version` increases by exactly one on every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: ConversationId,
    borrower_id: BorrowerId,
    phase: ConversationPhase,
    /// Monotonic mutation counter.
    version: u64,
    last_message_id: Option<MessageId>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Starts a new conversation in `Initiated`.
    pub fn start(borrower_id: BorrowerId) -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            borrower_id,
            phase: ConversationPhase::Initiated,
            version: 1,
            last_message_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a conversation from persistence (no validation).
    pub fn reconstitute(
        id: ConversationId,
        borrower_id: BorrowerId,
        phase: ConversationPhase,
        version: u64,
        last_message_id: Option<MessageId>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            borrower_id,
            phase,
            version,
            last_message_id,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Moves the conversation to a new phase through the state machine.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the phase graph forbids the move
    pub fn advance(&mut self, target: ConversationPhase) -> Result<(), DomainError> {
        self.phase = self
            .phase
            .transition_to(target)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        self.touch();
        Ok(())
    }

    /// Crisis override: re-enters `PlanSuggested` from any non-terminal
    /// phase, bypassing the ordinary transition graph.
    ///
    /// Deterministic and independent of the current phase — a crisis signal
    /// always lands the conversation in `PlanSuggested` so relief plans go
    /// out immediately.
    ///
    /// # Errors
    ///
    /// - `ConversationClosed` if the conversation is already terminal
    pub fn apply_crisis_override(&mut self) -> Result<(), DomainError> {
        if !self.phase.is_active() {
            return Err(DomainError::new(
                ErrorCode::ConversationClosed,
                "Cannot apply crisis override to a closed conversation",
            ));
        }
        self.phase = ConversationPhase::PlanSuggested;
        self.touch();
        Ok(())
    }

    /// Records the most recent message in this conversation.
    pub fn record_message(&mut self, message_id: MessageId) {
        self.last_message_id = Some(message_id);
        self.touch();
    }

    fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Timestamp::now();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn borrower_id(&self) -> &BorrowerId {
        &self.borrower_id
    }

    pub fn phase(&self) -> ConversationPhase {
        self.phase
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn last_message_id(&self) -> Option<&MessageId> {
        self.last_message_id.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// True while the conversation is in a non-terminal phase.
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_begins_initiated_at_version_one() {
        let c = Conversation::start(BorrowerId::new());
        assert_eq!(c.phase(), ConversationPhase::Initiated);
        assert_eq!(c.version(), 1);
        assert!(c.is_active());
    }

    #[test]
    fn advance_follows_state_machine_and_bumps_version() {
        let mut c = Conversation::start(BorrowerId::new());
        c.advance(ConversationPhase::PlanSuggested).unwrap();
        assert_eq!(c.phase(), ConversationPhase::PlanSuggested);
        assert_eq!(c.version(), 2);
    }

    #[test]
    fn invalid_advance_is_rejected_without_version_bump() {
        let mut c = Conversation::start(BorrowerId::new());
        let err = c.advance(ConversationPhase::PlanAccepted).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(c.version(), 1);
    }

    #[test]
    fn crisis_override_bypasses_the_transition_graph() {
        let mut c = Conversation::start(BorrowerId::new());
        c.advance(ConversationPhase::PlanSuggested).unwrap();
        c.advance(ConversationPhase::PlanAccepted).unwrap();

        // PlanAccepted -> PlanSuggested is not an ordinary transition.
        c.apply_crisis_override().unwrap();
        assert_eq!(c.phase(), ConversationPhase::PlanSuggested);
    }

    #[test]
    fn crisis_override_fails_on_terminal_conversation() {
        let mut c = Conversation::start(BorrowerId::new());
        c.advance(ConversationPhase::LoanClosed).unwrap();
        let err = c.apply_crisis_override().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversationClosed);
    }

    #[test]
    fn record_message_tracks_last_message_and_version() {
        let mut c = Conversation::start(BorrowerId::new());
        let msg_id = MessageId::new();
        c.record_message(msg_id);
        assert_eq!(c.last_message_id(), Some(&msg_id));
        assert_eq!(c.version(), 2);
    }

    #[test]
    fn version_is_strictly_monotonic_across_mutations() {
        let mut c = Conversation::start(BorrowerId::new());
        let mut last = c.version();
        c.advance(ConversationPhase::PlanSuggested).unwrap();
        assert!(c.version() > last);
        last = c.version();
        c.record_message(MessageId::new());
        assert!(c.version() > last);
    }
}
