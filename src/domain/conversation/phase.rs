//! Conversation phase state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Lifecycle phase of a borrower conversation.
///
/// Ordinary flow:
/// `Initiated → PlanSuggested → {PlanAccepted | PlanRejected} → Resolved`,
/// with `PlanRejected → PlanSuggested` for auto-revision and restore.
/// `Resolved` and `LoanClosed` are terminal.
///
/// The crisis override bypasses this machine entirely: see
/// [`Conversation::apply_crisis_override`](super::Conversation::apply_crisis_override).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Outreach sent, awaiting the borrower's first reply.
    #[default]
    Initiated,

    /// Plan A/B offered, awaiting a decision.
    PlanSuggested,

    /// Borrower accepted a plan.
    PlanAccepted,

    /// Borrower rejected the latest plan.
    PlanRejected,

    /// Negotiation concluded; read-only.
    Resolved,

    /// Underlying loan closed externally; read-only.
    LoanClosed,
}

impl ConversationPhase {
    /// Returns true while the conversation can still move.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Resolved | Self::LoanClosed)
    }

    /// Returns true once a plan decision is awaited.
    pub fn awaiting_decision(&self) -> bool {
        matches!(self, Self::PlanSuggested)
    }
}

impl StateMachine for ConversationPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationPhase::*;
        matches!(
            (self, target),
            // First plans offered
            (Initiated, PlanSuggested) |
            // Borrower decides
            (PlanSuggested, PlanAccepted) |
            (PlanSuggested, PlanRejected) |
            // Acceptance concludes the negotiation
            (PlanAccepted, Resolved) |
            // Auto-revision or restore re-offers
            (PlanRejected, PlanSuggested) |
            // Manager closes out a dead-end rejection
            (PlanRejected, Resolved) |
            // Loan closure is valid from any live phase
            (Initiated, LoanClosed) |
            (PlanSuggested, LoanClosed) |
            (PlanAccepted, LoanClosed) |
            (PlanRejected, LoanClosed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationPhase::*;
        match self {
            Initiated => vec![PlanSuggested, LoanClosed],
            PlanSuggested => vec![PlanAccepted, PlanRejected, LoanClosed],
            PlanAccepted => vec![Resolved, LoanClosed],
            PlanRejected => vec![PlanSuggested, Resolved, LoanClosed],
            Resolved => vec![],
            LoanClosed => vec![],
        }
    }
}
