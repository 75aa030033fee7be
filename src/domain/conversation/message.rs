//! Message entity for the append-only message log.
//!
//! Messages are immutable once written; the only later annotation is the
//! delivery attempt tracked separately by the dispatcher. Automated messages
//! carry a snapshot of the conversation phase at send time and, when plans
//! were offered, the Plan A / Plan B payload.

use serde::{Deserialize, Serialize};

use crate::domain::classifier::StressLevel;
use crate::domain::foundation::{BorrowerId, DomainError, ManagerId, MessageId, Timestamp};
use crate::domain::plan::PlanPair;

use super::ConversationPhase;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The borrower replying over the inbound channel.
    Borrower,
    /// The engine writing as the assigned manager.
    System,
}

/// An immutable entry in the borrower/manager message log.
///
/// # Invariants
///
/// - `content` is non-empty (validated at construction)
/// - `automated` is true for every engine-generated message; manager-authored
///   messages entering through the external log are never automated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    borrower_id: BorrowerId,
    manager_id: ManagerId,
    sender: Sender,
    content: String,
    /// Quick stress read of borrower messages; `None` for system messages
    /// or unclassifiable text.
    sentiment: Option<StressLevel>,
    /// Conversation phase at the moment the message was written.
    phase_snapshot: ConversationPhase,
    /// Plan A / Plan B payload when this message offered plans.
    plans_offered: Option<PlanPair>,
    /// True for engine-generated messages; these are the ones removed by
    /// conversation deletion.
    automated: bool,
    created_at: Timestamp,
}

impl Message {
    /// Creates a borrower-authored message.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is empty
    pub fn from_borrower(
        borrower_id: BorrowerId,
        manager_id: ManagerId,
        content: impl Into<String>,
        sentiment: Option<StressLevel>,
        phase_snapshot: ConversationPhase,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        Self::validate_content(&content)?;
        Ok(Self {
            id: MessageId::new(),
            borrower_id,
            manager_id,
            sender: Sender::Borrower,
            content,
            sentiment,
            phase_snapshot,
            plans_offered: None,
            automated: false,
            created_at: Timestamp::now(),
        })
    }

    /// Creates an automated system message (authored as the manager).
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is empty
    pub fn automated(
        borrower_id: BorrowerId,
        manager_id: ManagerId,
        content: impl Into<String>,
        phase_snapshot: ConversationPhase,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        Self::validate_content(&content)?;
        Ok(Self {
            id: MessageId::new(),
            borrower_id,
            manager_id,
            sender: Sender::System,
            content,
            sentiment: None,
            phase_snapshot,
            plans_offered: None,
            automated: true,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a manager-authored (non-automated) message.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if content is empty
    pub fn from_manager(
        borrower_id: BorrowerId,
        manager_id: ManagerId,
        content: impl Into<String>,
        phase_snapshot: ConversationPhase,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        Self::validate_content(&content)?;
        Ok(Self {
            id: MessageId::new(),
            borrower_id,
            manager_id,
            sender: Sender::System,
            content,
            sentiment: None,
            phase_snapshot,
            plans_offered: None,
            automated: false,
            created_at: Timestamp::now(),
        })
    }

    /// Attaches the offered plan pair. Consumed at construction time only;
    /// messages never change once appended.
    pub fn with_plans(mut self, plans: PlanPair) -> Self {
        self.plans_offered = Some(plans);
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn borrower_id(&self) -> &BorrowerId {
        &self.borrower_id
    }

    pub fn manager_id(&self) -> &ManagerId {
        &self.manager_id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sentiment(&self) -> Option<StressLevel> {
        self.sentiment
    }

    pub fn phase_snapshot(&self) -> ConversationPhase {
        self.phase_snapshot
    }

    pub fn plans_offered(&self) -> Option<&PlanPair> {
        self.plans_offered.as_ref()
    }

    pub fn is_automated(&self) -> bool {
        self.automated
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn is_from_borrower(&self) -> bool {
        self.sender == Sender::Borrower
    }

    fn validate_content(content: &str) -> Result<(), DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation(
                "content",
                "Message content cannot be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (BorrowerId, ManagerId) {
        (BorrowerId::new(), ManagerId::new())
    }

    #[test]
    fn borrower_message_carries_sentiment() {
        let (b, m) = ids();
        let msg = Message::from_borrower(
            b,
            m,
            "salary delay this month",
            Some(StressLevel::Moderate),
            ConversationPhase::Initiated,
        )
        .unwrap();
        assert!(msg.is_from_borrower());
        assert!(!msg.is_automated());
        assert_eq!(msg.sentiment(), Some(StressLevel::Moderate));
    }

    #[test]
    fn automated_message_is_flagged() {
        let (b, m) = ids();
        let msg =
            Message::automated(b, m, "Hello!", ConversationPhase::Initiated).unwrap();
        assert!(msg.is_automated());
        assert_eq!(msg.sender(), Sender::System);
    }

    #[test]
    fn manager_message_is_not_automated() {
        let (b, m) = ids();
        let msg = Message::from_manager(b, m, "Called the borrower", ConversationPhase::PlanSuggested)
            .unwrap();
        assert!(!msg.is_automated());
        assert_eq!(msg.sender(), Sender::System);
    }

    #[test]
    fn rejects_empty_content() {
        let (b, m) = ids();
        assert!(Message::automated(b, m, "   ", ConversationPhase::Initiated).is_err());
    }

    #[test]
    fn with_plans_attaches_payload() {
        use crate::domain::plan::PlanTerms;
        let (b, m) = ids();
        let pair = PlanPair {
            plan_a: PlanTerms {
                suggested_emi: 5_200,
                extended_tenure_months: 9,
                grace_period_days: 21,
                interest_waiver_pct: 0,
            },
            plan_b: PlanTerms {
                suggested_emi: 4_400,
                extended_tenure_months: 15,
                grace_period_days: 30,
                interest_waiver_pct: 2,
            },
        };
        let msg = Message::automated(b, m, "plans", ConversationPhase::PlanSuggested)
            .unwrap()
            .with_plans(pair);
        assert_eq!(msg.plans_offered(), Some(&pair));
        assert_eq!(msg.phase_snapshot(), ConversationPhase::PlanSuggested);
    }
}
